//! Core utilities, configuration, and common functionality

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod metrics_server;
pub mod validation;

// Re-exports for convenience
pub use error::{AppError, AppResult, FlowError};
pub use logging::{init_logger, log_startup_configuration};
