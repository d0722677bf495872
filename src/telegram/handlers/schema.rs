//! Dispatcher schema and handler chain builders

use chrono::Utc;
use rusqlite::Connection;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::core::cycle::ReportingCycle;
use crate::core::error::{AppError, AppResult};
use crate::core::stats;
use crate::storage::get_connection;
use crate::survey::{admin, cargo, CallbackAction, Reply};
use crate::telegram::bot::Command;
use crate::telegram::keyboards::{send_replies, send_reply};

const GREETING: &str = "Привет! Я помогу вести учет грузов.\n\
                        /load — внести новый груз";
const UNKNOWN_ACTION_MSG: &str = "Неизвестное действие";
const GENERIC_ERROR_MSG: &str = "Произошла ошибка, попробуйте еще раз";

/// Creates the main dispatcher schema for the Telegram bot.
///
/// This function returns a handler tree that can be used with teloxide's
/// Dispatcher. The same schema is used in production and in integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_admin = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Command handler (/start, /load)
        .branch(command_handler(deps_commands))
        // Admin chat: dash-named commands and wizard input
        .branch(admin_message_handler(deps_admin))
        // Free text from any other chat feeds the cargo survey
        .branch(message_handler(deps_messages))
        // Callback query handler (inline keyboard buttons)
        .branch(callback_handler(deps_callback))
}

/// Maps an engine step result to outbound replies.
///
/// On failure the user gets a generic retry message instead of silence; the
/// slot was not advanced, so answering again retries the same step.
fn replies_or_failure(result: AppResult<Option<Vec<Reply>>>, chat_id: ChatId) -> Option<Vec<Reply>> {
    match result {
        Ok(replies) => replies,
        Err(e) => {
            log::error!("Survey step failed for chat {}: {}", chat_id, e);
            Some(vec![Reply::text(GENERIC_ERROR_MSG)])
        }
    }
}

/// The `/stat-month` response: the report for a complete window, a pointer to
/// the window commands otherwise.
fn stat_month_report(conn: &Connection, cycle: &ReportingCycle) -> AppResult<String> {
    match cycle.window() {
        Some((start, end)) => stats::monthly_report(conn, start, end),
        None => Ok(stats::NO_WINDOW_MSG.to_string()),
    }
}

/// Handler for bot commands (/start, /load)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => {
                        if let Err(e) = bot.send_message(msg.chat.id, GREETING).await {
                            log::error!("/start failed for chat {}: {}", msg.chat.id, e);
                        }
                    }
                    Command::Load => {
                        // /load always starts over, discarding any survey in flight
                        let slot = deps.surveys.slot(msg.chat.id.0);
                        let mut guard = slot.lock().await;
                        let reply = cargo::start(&mut guard);
                        drop(guard);
                        if let Err(e) = send_reply(&bot, msg.chat.id, &reply).await {
                            log::error!("/load failed for chat {}: {}", msg.chat.id, e);
                        }
                    }
                }
                Ok(())
            }
        },
    ))
}

/// Handler for the admin chat: dash-named commands (not expressible in the
/// Command enum) and text feeding an admin wizard.
fn admin_message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let admin_chat = deps.admin_chat;
    Update::filter_message()
        .filter(move |msg: Message| admin_chat.0 != 0 && msg.chat.id == admin_chat && msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_admin_message(&bot, &msg, &deps).await {
                    log::error!("Admin handler failed for chat {}: {}", msg.chat.id, e);
                    let _ = bot.send_message(msg.chat.id, format!("Ошибка: {}", e)).await;
                }
                Ok(())
            }
        })
}

async fn handle_admin_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let text = msg.text().unwrap_or_default().trim();
    let slot = deps.surveys.slot(msg.chat.id.0);
    let mut guard = slot.lock().await;

    // Fixed commands win over a wizard in flight
    match text {
        "/add-dispatcher" => {
            let reply = admin::start_add_dispatcher(&mut guard);
            drop(guard);
            send_reply(bot, msg.chat.id, &reply).await?;
            return Ok(());
        }
        "/add-mc" => {
            let reply = admin::start_add_mc(&mut guard);
            drop(guard);
            send_reply(bot, msg.chat.id, &reply).await?;
            return Ok(());
        }
        "/add-driver" => {
            let reply = admin::start_add_driver(&mut guard);
            drop(guard);
            send_reply(bot, msg.chat.id, &reply).await?;
            return Ok(());
        }
        "/open-month" => {
            drop(guard);
            let today = Utc::now().date_naive();
            let mut cycle = deps.cycle.lock().await;
            cycle.open_month(today);
            let start = cycle.month_start;
            drop(cycle);
            log::info!("Reporting month opened, start = {:?}", start);
            bot.send_message(msg.chat.id, "Месяц открыт ✅").await?;
            return Ok(());
        }
        "/close-month" => {
            drop(guard);
            let today = Utc::now().date_naive();
            let mut cycle = deps.cycle.lock().await;
            cycle.close_month(today);
            drop(cycle);
            log::info!("Reporting month closed at {}", today);
            bot.send_message(msg.chat.id, "Месяц закрыт ✅").await?;
            return Ok(());
        }
        "/stat-month" => {
            drop(guard);
            let cycle = *deps.cycle.lock().await;
            let conn = get_connection(&deps.db_pool)?;
            let report = stat_month_report(&conn, &cycle)?;
            bot.send_message(msg.chat.id, report).await?;
            return Ok(());
        }
        _ => {}
    }

    let conn = get_connection(&deps.db_pool)?;
    // Admin wizard in flight, then the cargo survey, then silence
    let replies = match admin::handle_text(&mut guard, &conn, text)? {
        Some(replies) => Some(replies),
        None => cargo::handle_text(&mut guard, &conn, text)?,
    };
    drop(guard);

    if let Some(replies) = replies {
        send_replies(bot, msg.chat.id, &replies).await?;
    }
    Ok(())
}

/// Handler for free-form text in non-admin chats
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default().to_string();
                let slot = deps.surveys.slot(msg.chat.id.0);
                let mut guard = slot.lock().await;

                let result = get_connection(&deps.db_pool)
                    .map_err(AppError::from)
                    .and_then(|conn| cargo::handle_text(&mut guard, &conn, &text));
                drop(guard);

                // Ok(None) means no survey in flight: the text is ignored
                if let Some(replies) = replies_or_failure(result, msg.chat.id) {
                    if let Err(e) = send_replies(&bot, msg.chat.id, &replies).await {
                        log::error!("Failed to reply to chat {}: {}", msg.chat.id, e);
                    }
                }
                Ok(())
            }
        })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = handle_callback(&bot, &q, &deps).await {
                log::error!("Callback handling failed for user {}: {}", q.from.id, e);
            }
            Ok(())
        }
    })
}

async fn handle_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = match q.message.as_ref() {
        Some(message) => message.chat().id,
        // Callback from an inline-mode message has no chat attached
        None => {
            bot.answer_callback_query(q.id.clone()).await?;
            return Ok(());
        }
    };

    let action = q.data.as_deref().and_then(CallbackAction::parse);
    let action = match action {
        Some(action) => {
            bot.answer_callback_query(q.id.clone()).await?;
            action
        }
        None => {
            log::warn!("Unknown callback payload from chat {}: {:?}", chat_id, q.data);
            bot.answer_callback_query(q.id.clone()).text(UNKNOWN_ACTION_MSG).await?;
            return Ok(());
        }
    };

    let slot = deps.surveys.slot(chat_id.0);
    let mut guard = slot.lock().await;

    let result = get_connection(&deps.db_pool)
        .map_err(AppError::from)
        .and_then(|conn| match cargo::handle_callback(&mut guard, &conn, &action)? {
            Some(replies) => Ok(Some(replies)),
            None => admin::handle_callback(&mut guard, &conn, &action),
        });
    drop(guard);

    match replies_or_failure(result, chat_id) {
        Some(replies) => send_replies(bot, chat_id, &replies).await?,
        // Stale button press after the survey finished: nothing to do
        None => log::debug!("Stale callback {:?} for chat {}", action, chat_id),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::storage::db;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::migrate_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_engine_failure_becomes_generic_message() {
        let failed: AppResult<Option<Vec<Reply>>> =
            Err(AppError::Validation("cargo draft is missing number".to_string()));
        let replies = replies_or_failure(failed, ChatId(1)).unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, GENERIC_ERROR_MSG);
        assert!(replies[0].menu.is_none());
    }

    #[test]
    fn test_engine_results_pass_through_unchanged() {
        // No survey in flight stays silent
        assert!(replies_or_failure(Ok(None), ChatId(1)).is_none());

        let replies = replies_or_failure(Ok(Some(vec![Reply::text("Введите номер груза")])), ChatId(1)).unwrap();
        assert_eq!(replies[0].text, "Введите номер груза");
    }

    #[test]
    fn test_stat_month_without_window_points_at_commands() {
        let conn = test_conn();
        let report = stat_month_report(&conn, &ReportingCycle::new()).unwrap();
        assert_eq!(report, stats::NO_WINDOW_MSG);

        // Only one bound set is still no window
        let mut cycle = ReportingCycle::new();
        cycle.open_month(NaiveDate::from_ymd_opt(2026, 8, 29).unwrap());
        let report = stat_month_report(&conn, &cycle).unwrap();
        assert_eq!(report, stats::NO_WINDOW_MSG);
    }

    #[test]
    fn test_stat_month_with_window_runs_the_report() {
        let conn = test_conn();
        let mut cycle = ReportingCycle::new();
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        cycle.open_month(today);
        cycle.close_month(today);

        // Window set but nothing recorded yet
        let report = stat_month_report(&conn, &cycle).unwrap();
        assert_eq!(report, stats::NO_DATA_MSG);
    }
}
