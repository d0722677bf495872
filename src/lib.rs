//! DriverNet - Telegram bot for trucking cargo accounting
//!
//! This library provides all the core functionality for the DriverNet bot:
//! cargo intake surveys, reference data management, monthly statistics,
//! database operations, and Telegram bot integration.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, reporting cycle, and statistics
//! - `storage`: SQLite persistence for cargos and reference data
//! - `survey`: Transport-agnostic survey state machines
//! - `telegram`: Telegram bot integration and handlers

pub mod core;
pub mod storage;
pub mod survey;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, BotError};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
pub use survey::{Survey, SurveyStore};
pub use telegram::{schema, HandlerDeps, HandlerError};
