//! Bot initialization and command definitions

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "внести новый груз")]
    Load,
}

/// Creates a Bot instance from the configured token
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Bot token is missing
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.as_str();
    if token.is_empty() {
        anyhow::bail!("BOT_TOKEN is not set");
    }
    Ok(Bot::new(token))
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "начать работу с ботом"),
        BotCommand::new("load", "внести новый груз"),
    ])
    .await?;

    Ok(())
}
