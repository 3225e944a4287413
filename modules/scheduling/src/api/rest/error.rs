use tracing::error;

use crate::api::problem::{
    bad_request, conflict, gone, internal_error, not_found, ProblemResponse,
};
use crate::domain::error::DomainError;

/// Map domain errors to RFC 9457 problem responses
pub fn problem_from_domain(err: DomainError) -> ProblemResponse {
    match err {
        DomainError::AppointmentNotFound { id } => {
            let p = not_found(format!("Appointment {id} not found"));
            ProblemResponse(p.0.with_code("appointment_not_found"))
        }
        DomainError::PatternNotFound { id } => {
            let p = not_found(format!("Recurrence pattern {id} not found"));
            ProblemResponse(p.0.with_code("pattern_not_found"))
        }
        DomainError::BlockNotFound { id } => {
            let p = not_found(format!("Block {id} not found"));
            ProblemResponse(p.0.with_code("block_not_found"))
        }
        DomainError::InvalidInterval => {
            let p = bad_request("Requested interval does not match any generated slot");
            ProblemResponse(p.0.with_code("invalid_interval"))
        }
        DomainError::SlotUnavailable => {
            let p = conflict("Slot is no longer available");
            ProblemResponse(p.0.with_code("slot_unavailable"))
        }
        DomainError::QuotaExceeded { .. } => {
            let p = conflict("Monthly booking quota exhausted");
            ProblemResponse(p.0.with_code("quota_exceeded"))
        }
        DomainError::AlreadyCancelled { id } => {
            let p = gone(format!("Appointment {id} is already cancelled"));
            ProblemResponse(p.0.with_code("already_cancelled"))
        }
        DomainError::Validation { field, message } => {
            let p = bad_request(format!("{field}: {message}"));
            ProblemResponse(p.0.with_code("validation"))
        }
        DomainError::Database { message } => {
            error!(error = %message, "Storage failure");
            let p = internal_error("Internal error");
            ProblemResponse(p.0.with_code("internal"))
        }
    }
}
