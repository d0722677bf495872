use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::types::ChatId;

use drivernet::core::{config, init_logger};
use drivernet::storage::create_pool;
use drivernet::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Set up global panic handler to catch panics in dispatcher
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;
    config::log_startup_configuration();

    let db_pool = Arc::new(create_pool(&config::DATABASE_PATH)?);
    log::info!("Database ready at {}", *config::DATABASE_PATH);

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let deps = HandlerDeps::new(db_pool, ChatId(*config::ADMIN_CHAT_ID));

    log::info!("Starting dispatcher");
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
