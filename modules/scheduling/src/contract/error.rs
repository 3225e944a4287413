use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone)]
pub enum SchedulingError {
    #[error("Appointment not found: {id}")]
    NotFound { id: Uuid },

    #[error("Requested interval is not a bookable slot")]
    InvalidInterval,

    #[error("Slot is no longer available")]
    SlotUnavailable,

    #[error("Monthly booking quota exhausted")]
    QuotaExceeded,

    #[error("Appointment is already cancelled: {id}")]
    AlreadyCancelled { id: Uuid },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl SchedulingError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn invalid_interval() -> Self {
        Self::InvalidInterval
    }

    pub fn slot_unavailable() -> Self {
        Self::SlotUnavailable
    }

    pub fn quota_exceeded() -> Self {
        Self::QuotaExceeded
    }

    pub fn already_cancelled(id: Uuid) -> Self {
        Self::AlreadyCancelled { id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}
