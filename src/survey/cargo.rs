//! Cargo intake survey: one field per user turn, validated before advancing
//!
//! Dispatcher, driver and MC are never collected as free text: the engine
//! offers only existing records as buttons, so a finished cargo always
//! references rows that existed at selection time.

use rusqlite::Connection;
use uuid::Uuid;

use crate::core::error::{AppError, AppResult};
use crate::storage::db::{self, Cargo};

use super::callback::{self, CallbackAction};
use super::state::{CargoField, CargoStep, CargoSurvey, Survey};
use super::{parse_non_negative, rows_of_two, Reply};

/// Literal re-prompt for malformed numeric input.
pub const INVALID_NUMBER_MSG: &str = "Пожалуйста, введите корректное число";

/// Starts (or restarts) the cargo survey for a conversation.
///
/// An in-flight survey in the slot is discarded without warning; `/load`
/// always begins from a clean draft.
pub fn start(slot: &mut Option<Survey>) -> Reply {
    *slot = Some(Survey::Cargo(CargoSurvey::new()));
    Reply::text("Введите номер груза")
}

/// Handles free text for the conversation's cargo survey.
///
/// Returns `Ok(None)` when the slot holds no cargo survey, so the caller can
/// route the text elsewhere.
pub fn handle_text(slot: &mut Option<Survey>, conn: &Connection, text: &str) -> AppResult<Option<Vec<Reply>>> {
    let survey = match slot {
        Some(Survey::Cargo(survey)) => survey,
        _ => return Ok(None),
    };

    let replies = match survey.step {
        CargoStep::Number => {
            if text.trim().is_empty() {
                vec![Reply::text("Введите номер груза")]
            } else {
                survey.draft.number = Some(text.trim().to_string());
                advance(survey, CargoStep::Dispatcher, conn)?
            }
        }
        CargoStep::MilesEmpty => match parse_non_negative(text) {
            Some(value) => {
                survey.draft.miles_empty = Some(value);
                advance(survey, CargoStep::MilesLoaded, conn)?
            }
            None => invalid_number(survey, conn)?,
        },
        CargoStep::MilesLoaded => match parse_non_negative(text) {
            Some(value) => {
                survey.draft.miles_loaded = Some(value);
                advance(survey, CargoStep::Cost, conn)?
            }
            None => invalid_number(survey, conn)?,
        },
        CargoStep::Cost => match parse_non_negative(text) {
            Some(value) => {
                survey.draft.cost = Some(value);
                advance(survey, CargoStep::Route, conn)?
            }
            None => invalid_number(survey, conn)?,
        },
        CargoStep::Route => {
            if text.trim().is_empty() {
                vec![Reply::text("Маршрут: из какого штата/города → в какой штат/город")]
            } else {
                survey.draft.route = Some(text.trim().to_string());
                confirmation(survey, conn)?
            }
        }
        // These steps only accept button presses; re-show the question.
        CargoStep::Dispatcher | CargoStep::Driver | CargoStep::Mc | CargoStep::Confirm | CargoStep::ChangeField => {
            prompt(survey, conn)?
        }
    };

    Ok(Some(replies))
}

/// Handles a parsed button press for the conversation's cargo survey.
///
/// Returns `Ok(None)` when the slot holds no cargo survey (for example a
/// stale second tap after the survey completed); the caller treats that as a
/// no-op or routes the action to another wizard.
pub fn handle_callback(
    slot: &mut Option<Survey>,
    conn: &Connection,
    action: &CallbackAction,
) -> AppResult<Option<Vec<Reply>>> {
    let survey = match slot {
        Some(Survey::Cargo(survey)) => survey,
        _ => return Ok(None),
    };

    let replies = match (survey.step, action) {
        (CargoStep::Dispatcher, CallbackAction::Dispatcher(name)) => {
            match db::get_dispatcher_by_name(conn, name)? {
                Some(dispatcher) => {
                    survey.draft.dispatcher_id = Some(dispatcher.id);
                    advance(survey, CargoStep::Driver, conn)?
                }
                None => {
                    // Deleted between menu render and tap: show the menu again
                    log::warn!("Dispatcher '{}' vanished mid-survey", name);
                    let mut replies = vec![Reply::text("Диспетчер не найден, выберите из списка")];
                    replies.extend(dispatcher_menu(conn)?);
                    replies
                }
            }
        }
        (CargoStep::Driver, CallbackAction::Driver(name)) => match db::get_driver_by_name(conn, name)? {
            Some(driver) => {
                survey.draft.driver_id = Some(driver.id);
                advance(survey, CargoStep::Mc, conn)?
            }
            None => {
                log::warn!("Driver '{}' vanished mid-survey", name);
                let mut replies = vec![Reply::text("Водитель не найден, выберите из списка")];
                replies.extend(driver_menu(conn)?);
                replies
            }
        },
        (CargoStep::Mc, CallbackAction::Mc(name)) => match db::get_mc_by_name(conn, name)? {
            Some(mc) => {
                survey.draft.mc_id = Some(mc.id);
                advance(survey, CargoStep::MilesEmpty, conn)?
            }
            None => {
                log::warn!("MC company '{}' vanished mid-survey", name);
                let mut replies = vec![Reply::text("MC компания не найдена, выберите из списка")];
                replies.extend(mc_menu(conn)?);
                replies
            }
        },
        (CargoStep::Confirm, CallbackAction::ConfirmYes) => {
            let cargo = compose(survey)?;
            db::add_cargo(conn, &cargo)?;
            log::info!("Cargo {} persisted (id {})", cargo.number, cargo.id);
            *slot = None;
            vec![Reply::text("Груз сохранен ✅")]
        }
        (CargoStep::Confirm, CallbackAction::ConfirmNo) => {
            survey.step = CargoStep::ChangeField;
            vec![change_menu()]
        }
        (CargoStep::ChangeField, CallbackAction::Change(field)) => {
            survey.step = field.step();
            survey.editing = true;
            prompt(survey, conn)?
        }
        (CargoStep::ChangeField, CallbackAction::CancelChanges) => confirmation(survey, conn)?,
        // An action that does not fit the current step: re-show the question.
        _ => prompt(survey, conn)?,
    };

    Ok(Some(replies))
}

/// Stores nothing, advances nothing: error message plus the same question.
fn invalid_number(survey: &CargoSurvey, conn: &Connection) -> AppResult<Vec<Reply>> {
    let mut replies = vec![Reply::text(INVALID_NUMBER_MSG)];
    replies.extend(prompt(survey, conn)?);
    Ok(replies)
}

/// Moves to the next step after a successfully stored field.
///
/// In editing mode the normal sequence is skipped and the survey returns
/// straight to the confirmation view.
fn advance(survey: &mut CargoSurvey, next: CargoStep, conn: &Connection) -> AppResult<Vec<Reply>> {
    if survey.editing {
        return confirmation(survey, conn);
    }
    survey.step = next;
    prompt(survey, conn)
}

/// The question (text or choice menu) for the survey's current step.
fn prompt(survey: &CargoSurvey, conn: &Connection) -> AppResult<Vec<Reply>> {
    let replies = match survey.step {
        CargoStep::Number => vec![Reply::text("Введите номер груза")],
        CargoStep::Dispatcher => dispatcher_menu(conn)?,
        CargoStep::Driver => driver_menu(conn)?,
        CargoStep::Mc => mc_menu(conn)?,
        CargoStep::MilesEmpty => vec![Reply::text("Введите сколько миль пустым:")],
        CargoStep::MilesLoaded => vec![Reply::text("Введите сколько миль с грузом:")],
        CargoStep::Cost => vec![Reply::text("Введите сколько платят за груз:")],
        CargoStep::Route => vec![Reply::text("Маршрут: из какого штата/города → в какой штат/город")],
        CargoStep::Confirm => confirmation_view(survey, conn)?,
        CargoStep::ChangeField => vec![change_menu()],
    };
    Ok(replies)
}

fn dispatcher_menu(conn: &Connection) -> AppResult<Vec<Reply>> {
    let dispatchers = db::get_all_dispatchers(conn)?;
    if dispatchers.is_empty() {
        return Ok(vec![Reply::text(
            "Список диспетчеров пуст. Добавьте диспетчера командой /add-dispatcher",
        )]);
    }
    let options = dispatchers
        .into_iter()
        .map(|d| (d.name.clone(), callback::dispatcher_payload(&d.name)))
        .collect();
    Ok(vec![Reply::menu("Выберите диспетчера:", rows_of_two(options))])
}

fn driver_menu(conn: &Connection) -> AppResult<Vec<Reply>> {
    let drivers = db::get_all_drivers(conn)?;
    if drivers.is_empty() {
        return Ok(vec![Reply::text(
            "Список водителей пуст. Добавьте водителя командой /add-driver",
        )]);
    }
    let options = drivers
        .into_iter()
        .map(|d| (d.name.clone(), callback::driver_payload(&d.name)))
        .collect();
    Ok(vec![Reply::menu("Выберите водителя:", rows_of_two(options))])
}

fn mc_menu(conn: &Connection) -> AppResult<Vec<Reply>> {
    let companies = db::get_all_mcs(conn)?;
    if companies.is_empty() {
        return Ok(vec![Reply::text(
            "Список MC компаний пуст. Добавьте компанию командой /add-mc",
        )]);
    }
    let options = companies
        .into_iter()
        .map(|mc| (mc.name.clone(), callback::mc_payload(&mc.name)))
        .collect();
    Ok(vec![Reply::menu("Выберите MC компанию:", rows_of_two(options))])
}

/// Menu of every editable field plus a way back to confirmation.
fn change_menu() -> Reply {
    let mut options: Vec<(String, String)> = CargoField::ALL
        .into_iter()
        .map(|field| (field.label().to_string(), callback::change_payload(field)))
        .collect();
    options.push(("Отменить изменения".to_string(), "cancel_changes".to_string()));
    Reply::menu("Что изменить?", rows_of_two(options))
}

/// Enters the confirmation step and renders the collected draft.
fn confirmation(survey: &mut CargoSurvey, conn: &Connection) -> AppResult<Vec<Reply>> {
    survey.step = CargoStep::Confirm;
    survey.editing = false;
    confirmation_view(survey, conn)
}

/// The confirmation card: every collected value with references resolved to
/// display names, plus a yes/no menu.
fn confirmation_view(survey: &CargoSurvey, conn: &Connection) -> AppResult<Vec<Reply>> {
    let draft = &survey.draft;

    let dispatcher = match draft.dispatcher_id {
        Some(id) => db::get_dispatcher(conn, id)?.map(|d| d.name),
        None => None,
    };
    let driver = match draft.driver_id {
        Some(id) => db::get_driver(conn, id)?.map(|d| d.name),
        None => None,
    };
    let mc = match draft.mc_id {
        Some(id) => db::get_mc(conn, id)?.map(|m| m.name),
        None => None,
    };

    let dash = || "—".to_string();
    let num = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(dash);

    let text = format!(
        "Проверьте данные:\n\
         Номер: {}\n\
         Диспетчер: {}\n\
         Водитель: {}\n\
         MC: {}\n\
         Мили пустым: {}\n\
         Мили с грузом: {}\n\
         Оплата: {}\n\
         Маршрут: {}\n\n\
         Все верно?",
        draft.number.clone().unwrap_or_else(dash),
        dispatcher.unwrap_or_else(dash),
        driver.unwrap_or_else(dash),
        mc.unwrap_or_else(dash),
        num(draft.miles_empty),
        num(draft.miles_loaded),
        num(draft.cost),
        draft.route.clone().unwrap_or_else(dash),
    );

    let menu = vec![vec![
        ("Да".to_string(), "confirm_yes".to_string()),
        ("Нет".to_string(), "confirm_no".to_string()),
    ]];
    Ok(vec![Reply::menu(text, menu)])
}

/// Builds the final record from a fully collected draft.
fn compose(survey: &CargoSurvey) -> AppResult<Cargo> {
    let draft = &survey.draft;
    let missing = |field: &str| AppError::Validation(format!("cargo draft is missing {field}"));
    Ok(Cargo {
        id: Uuid::new_v4(),
        number: draft.number.clone().ok_or_else(|| missing("number"))?,
        dispatcher_id: draft.dispatcher_id.ok_or_else(|| missing("dispatcher"))?,
        driver_id: draft.driver_id.ok_or_else(|| missing("driver"))?,
        mc_id: draft.mc_id.ok_or_else(|| missing("mc"))?,
        miles_empty: draft.miles_empty.ok_or_else(|| missing("miles_empty"))?,
        miles_loaded: draft.miles_loaded.ok_or_else(|| missing("miles_loaded"))?,
        cost: draft.cost.ok_or_else(|| missing("cost"))?,
        route: draft.route.clone().ok_or_else(|| missing("route"))?,
        created_at: chrono::Utc::now(),
    })
}
