use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Appointment not found: {id}")]
    AppointmentNotFound { id: Uuid },

    #[error("Recurrence pattern not found: {id}")]
    PatternNotFound { id: Uuid },

    #[error("Block not found: {id}")]
    BlockNotFound { id: Uuid },

    #[error("Interval does not match any generated slot")]
    InvalidInterval,

    #[error("Slot already taken or blocked")]
    SlotUnavailable,

    #[error("Monthly quota exhausted for student {student_id} in course {course_id}")]
    QuotaExceeded { student_id: Uuid, course_id: Uuid },

    #[error("Appointment already cancelled: {id}")]
    AlreadyCancelled { id: Uuid },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },
}

impl DomainError {
    pub fn appointment_not_found(id: Uuid) -> Self {
        Self::AppointmentNotFound { id }
    }

    pub fn pattern_not_found(id: Uuid) -> Self {
        Self::PatternNotFound { id }
    }

    pub fn block_not_found(id: Uuid) -> Self {
        Self::BlockNotFound { id }
    }

    pub fn invalid_interval() -> Self {
        Self::InvalidInterval
    }

    pub fn slot_unavailable() -> Self {
        Self::SlotUnavailable
    }

    pub fn quota_exceeded(student_id: Uuid, course_id: Uuid) -> Self {
        Self::QuotaExceeded {
            student_id,
            course_id,
        }
    }

    pub fn already_cancelled(id: Uuid) -> Self {
        Self::AlreadyCancelled { id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
