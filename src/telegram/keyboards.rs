//! Rendering of survey replies into Telegram messages

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::survey::Reply;

/// Builds the inline keyboard for a reply, if it carries one.
pub fn markup_for(reply: &Reply) -> Option<InlineKeyboardMarkup> {
    let rows = reply.menu.as_ref()?;
    let buttons: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|(label, payload)| InlineKeyboardButton::callback(label.clone(), payload.clone()))
                .collect()
        })
        .collect();
    Some(InlineKeyboardMarkup::new(buttons))
}

/// Sends one reply to a chat, attaching its keyboard when present.
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<(), teloxide::RequestError> {
    let request = bot.send_message(chat_id, &reply.text);
    match markup_for(reply) {
        Some(markup) => request.reply_markup(markup).await?,
        None => request.await?,
    };
    Ok(())
}

/// Sends a batch of replies in order.
pub async fn send_replies(bot: &Bot, chat_id: ChatId, replies: &[Reply]) -> Result<(), teloxide::RequestError> {
    for reply in replies {
        send_reply(bot, chat_id, reply).await?;
    }
    Ok(())
}
