use once_cell::sync::Lazy;
use std::env;

/// Configuration constants for the bot
/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: drivernet.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "drivernet.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: drivernet.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "drivernet.log".to_string()));

/// Chat id of the operations chat where admin commands are accepted
/// Read from ADMIN_CHAT_ID environment variable
/// The previous deployment hard-coded this id; it must be configured now.
/// 0 (unset / unparsable) disables all admin commands.
pub static ADMIN_CHAT_ID: Lazy<i64> = Lazy::new(|| {
    env::var("ADMIN_CHAT_ID")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(0)
});

/// Logs configuration state at application startup
pub fn log_startup_configuration() {
    log::info!("Database path: {}", *DATABASE_PATH);
    log::info!("Log file path: {}", *LOG_FILE_PATH);
    if *ADMIN_CHAT_ID == 0 {
        log::warn!("ADMIN_CHAT_ID is not set - admin commands are disabled");
    } else {
        log::info!("Admin chat id: {}", *ADMIN_CHAT_ID);
    }
    if BOT_TOKEN.is_empty() {
        log::warn!("BOT_TOKEN is not set - the bot will fail to start");
    }
}
