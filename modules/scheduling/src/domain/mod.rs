pub mod error;
pub mod ports;
pub mod service;
pub mod slots;

pub use error::DomainError;
pub use service::SchedulingService;
