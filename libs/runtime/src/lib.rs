//! Runtime support for the ClassGrid server: layered configuration and
//! logging initialization. No domain logic lives here.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig};
