//! Core utilities, configuration, and common functionality

pub mod config;
pub mod cycle;
pub mod error;
pub mod logging;
pub mod stats;

// Re-exports for convenience
pub use cycle::ReportingCycle;
pub use error::{AppError, AppResult, BotError};
pub use logging::init_logger;
