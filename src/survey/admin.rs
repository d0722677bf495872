//! Admin data-entry wizards: add dispatcher, add MC company, add driver
//!
//! Each wizard is a short linear sequence ending in the same yes/no
//! confirmation the cargo survey uses. State lives in the same per-chat slot,
//! so two admins in different chats never touch each other's wizard.

use rusqlite::Connection;
use uuid::Uuid;

use crate::core::error::AppResult;
use crate::storage::db::{self, Dispatcher, Driver, McCompany};

use super::callback::{self, CallbackAction};
use super::cargo::INVALID_NUMBER_MSG;
use super::state::{AddDispatcherStep, AddDriverStep, AddMcStep, Survey};
use super::{parse_non_negative, rows_of_two, Reply};

pub fn start_add_dispatcher(slot: &mut Option<Survey>) -> Reply {
    *slot = Some(Survey::AddDispatcher(AddDispatcherStep::Name));
    Reply::text("Введите имя диспетчера:")
}

pub fn start_add_mc(slot: &mut Option<Survey>) -> Reply {
    *slot = Some(Survey::AddMc(AddMcStep::Name));
    Reply::text("Введите название MC компании:")
}

pub fn start_add_driver(slot: &mut Option<Survey>) -> Reply {
    *slot = Some(Survey::AddDriver(AddDriverStep::Name));
    Reply::text("Введите имя водителя:")
}

/// Handles free text as the next wizard answer.
///
/// Returns `Ok(None)` when no admin wizard is in flight in this slot.
pub fn handle_text(slot: &mut Option<Survey>, conn: &Connection, text: &str) -> AppResult<Option<Vec<Reply>>> {
    let trimmed = text.trim();

    let replies = match slot {
        Some(Survey::AddDispatcher(step)) => match step {
            AddDispatcherStep::Name => {
                if trimmed.is_empty() {
                    vec![Reply::text("Введите имя диспетчера:")]
                } else {
                    *step = AddDispatcherStep::Percent {
                        name: trimmed.to_string(),
                    };
                    vec![Reply::text("Введите процент диспетчера (например 1.5):")]
                }
            }
            AddDispatcherStep::Percent { name } => match parse_non_negative(trimmed) {
                Some(percent) => {
                    let name = name.clone();
                    let card = format!("Диспетчер: {}\nПроцент: {}%\n\nСохранить?", name, percent);
                    *step = AddDispatcherStep::Confirm { name, percent };
                    vec![Reply::menu(card, confirm_row())]
                }
                None => vec![
                    Reply::text(INVALID_NUMBER_MSG),
                    Reply::text("Введите процент диспетчера (например 1.5):"),
                ],
            },
            AddDispatcherStep::Confirm { .. } => vec![Reply::text("Подтвердите кнопками: Да или Нет")],
        },
        Some(Survey::AddMc(step)) => match step {
            AddMcStep::Name => {
                if trimmed.is_empty() {
                    vec![Reply::text("Введите название MC компании:")]
                } else {
                    let card = format!("MC компания: {}\n\nСохранить?", trimmed);
                    *step = AddMcStep::Confirm {
                        name: trimmed.to_string(),
                    };
                    vec![Reply::menu(card, confirm_row())]
                }
            }
            AddMcStep::Confirm { .. } => vec![Reply::text("Подтвердите кнопками: Да или Нет")],
        },
        Some(Survey::AddDriver(step)) => match step {
            AddDriverStep::Name => {
                if trimmed.is_empty() {
                    vec![Reply::text("Введите имя водителя:")]
                } else {
                    *step = AddDriverStep::Mc {
                        name: trimmed.to_string(),
                    };
                    mc_menu(conn)?
                }
            }
            AddDriverStep::Mc { .. } => mc_menu(conn)?,
            AddDriverStep::Confirm { .. } => vec![Reply::text("Подтвердите кнопками: Да или Нет")],
        },
        _ => return Ok(None),
    };

    Ok(Some(replies))
}

/// Handles a button press for the in-flight admin wizard.
///
/// Returns `Ok(None)` when no admin wizard is in flight in this slot.
pub fn handle_callback(
    slot: &mut Option<Survey>,
    conn: &Connection,
    action: &CallbackAction,
) -> AppResult<Option<Vec<Reply>>> {
    let replies = match (&mut *slot, action) {
        (Some(Survey::AddDriver(AddDriverStep::Mc { name })), CallbackAction::Mc(mc_name)) => {
            match db::get_mc_by_name(conn, mc_name)? {
                Some(mc) => {
                    let name = name.clone();
                    let card = format!("Водитель: {}\nMC компания: {}\n\nСохранить?", name, mc.name);
                    *slot = Some(Survey::AddDriver(AddDriverStep::Confirm {
                        name,
                        mc_name: mc.name,
                    }));
                    vec![Reply::menu(card, confirm_row())]
                }
                None => {
                    log::warn!("MC company '{}' vanished during add-driver wizard", mc_name);
                    let mut replies = vec![Reply::text("MC компания не найдена, выберите из списка")];
                    replies.extend(mc_menu(conn)?);
                    replies
                }
            }
        }
        (Some(Survey::AddDispatcher(AddDispatcherStep::Confirm { name, percent })), CallbackAction::ConfirmYes) => {
            let dispatcher = Dispatcher {
                id: Uuid::new_v4(),
                name: name.clone(),
                percent: *percent,
            };
            db::add_dispatcher(conn, &dispatcher)?;
            log::info!("Dispatcher '{}' added ({}%)", dispatcher.name, dispatcher.percent);
            *slot = None;
            vec![Reply::text("Диспетчер сохранен ✅")]
        }
        (Some(Survey::AddMc(AddMcStep::Confirm { name })), CallbackAction::ConfirmYes) => {
            let mc = McCompany {
                id: Uuid::new_v4(),
                name: name.clone(),
            };
            db::add_mc(conn, &mc)?;
            log::info!("MC company '{}' added", mc.name);
            *slot = None;
            vec![Reply::text("MC компания сохранена ✅")]
        }
        (Some(Survey::AddDriver(AddDriverStep::Confirm { name, mc_name })), CallbackAction::ConfirmYes) => {
            let driver = Driver {
                id: Uuid::new_v4(),
                name: name.clone(),
                mc_name: mc_name.clone(),
            };
            db::add_driver(conn, &driver)?;
            log::info!("Driver '{}' added (MC '{}')", driver.name, driver.mc_name);
            *slot = None;
            vec![Reply::text("Водитель сохранен ✅")]
        }
        (Some(survey), CallbackAction::ConfirmNo) if survey.is_admin_wizard() => {
            // Discard the wizard entirely
            *slot = None;
            vec![Reply::text("Отменено")]
        }
        (Some(survey), _) if survey.is_admin_wizard() => {
            // A press that does not fit the current step
            vec![Reply::text("Подтвердите кнопками: Да или Нет")]
        }
        _ => return Ok(None),
    };

    Ok(Some(replies))
}

fn confirm_row() -> Vec<Vec<(String, String)>> {
    vec![vec![
        ("Да".to_string(), "confirm_yes".to_string()),
        ("Нет".to_string(), "confirm_no".to_string()),
    ]]
}

fn mc_menu(conn: &Connection) -> AppResult<Vec<Reply>> {
    let companies = db::get_all_mcs(conn)?;
    if companies.is_empty() {
        return Ok(vec![Reply::text(
            "Список MC компаний пуст. Сначала добавьте компанию командой /add-mc",
        )]);
    }
    let options = companies
        .into_iter()
        .map(|mc| (mc.name.clone(), callback::mc_payload(&mc.name)))
        .collect();
    Ok(vec![Reply::menu("Выберите MC компанию для водителя:", rows_of_two(options))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::migrate_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_add_dispatcher_happy_path() {
        let conn = test_conn();
        let mut slot = None;

        start_add_dispatcher(&mut slot);
        handle_text(&mut slot, &conn, "Dean Clark").unwrap();
        let replies = handle_text(&mut slot, &conn, "1.5").unwrap().unwrap();
        assert!(replies[0].text.contains("Dean Clark"));
        assert!(replies[0].text.contains("1.5"));

        handle_callback(&mut slot, &conn, &CallbackAction::ConfirmYes).unwrap();
        assert!(slot.is_none());

        let dispatcher = db::get_dispatcher_by_name(&conn, "Dean Clark").unwrap().unwrap();
        assert_eq!(dispatcher.percent, 1.5);
    }

    #[test]
    fn test_add_dispatcher_rejects_bad_percent() {
        let conn = test_conn();
        let mut slot = None;

        start_add_dispatcher(&mut slot);
        handle_text(&mut slot, &conn, "Dean Clark").unwrap();
        let replies = handle_text(&mut slot, &conn, "two percent").unwrap().unwrap();
        assert_eq!(replies[0].text, INVALID_NUMBER_MSG);

        // Still at the percent question
        match &slot {
            Some(Survey::AddDispatcher(AddDispatcherStep::Percent { name })) => assert_eq!(name, "Dean Clark"),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_add_dispatcher_discard_on_no() {
        let conn = test_conn();
        let mut slot = None;

        start_add_dispatcher(&mut slot);
        handle_text(&mut slot, &conn, "Dean Clark").unwrap();
        handle_text(&mut slot, &conn, "2").unwrap();
        let replies = handle_callback(&mut slot, &conn, &CallbackAction::ConfirmNo)
            .unwrap()
            .unwrap();
        assert_eq!(replies[0].text, "Отменено");
        assert!(slot.is_none());
        assert_eq!(db::get_all_dispatchers(&conn).unwrap().len(), 0);
    }

    #[test]
    fn test_add_mc_happy_path() {
        let conn = test_conn();
        let mut slot = None;

        start_add_mc(&mut slot);
        handle_text(&mut slot, &conn, "FastLine").unwrap();
        handle_callback(&mut slot, &conn, &CallbackAction::ConfirmYes).unwrap();

        assert!(slot.is_none());
        assert!(db::get_mc_by_name(&conn, "FastLine").unwrap().is_some());
    }

    #[test]
    fn test_add_driver_requires_existing_mc() {
        let conn = test_conn();
        let mut slot = None;

        start_add_driver(&mut slot);
        // No MC companies yet: the wizard says so instead of offering a menu
        let replies = handle_text(&mut slot, &conn, "Ivan").unwrap().unwrap();
        assert!(replies[0].text.contains("пуст"));

        db::add_mc(
            &conn,
            &McCompany {
                id: Uuid::new_v4(),
                name: "FastLine".to_string(),
            },
        )
        .unwrap();

        // Unknown selection re-shows the menu
        let replies = handle_callback(&mut slot, &conn, &CallbackAction::Mc("Ghost".to_string()))
            .unwrap()
            .unwrap();
        assert!(replies[0].text.contains("не найдена"));

        handle_callback(&mut slot, &conn, &CallbackAction::Mc("FastLine".to_string())).unwrap();
        handle_callback(&mut slot, &conn, &CallbackAction::ConfirmYes).unwrap();

        let driver = db::get_driver_by_name(&conn, "Ivan").unwrap().unwrap();
        assert_eq!(driver.mc_name, "FastLine");
    }

    #[test]
    fn test_add_driver_mc_selection_enters_confirmation() {
        let conn = test_conn();
        db::add_mc(
            &conn,
            &McCompany {
                id: Uuid::new_v4(),
                name: "FastLine".to_string(),
            },
        )
        .unwrap();

        let mut slot = None;
        start_add_driver(&mut slot);
        handle_text(&mut slot, &conn, "Ivan").unwrap();

        let replies = handle_callback(&mut slot, &conn, &CallbackAction::Mc("FastLine".to_string()))
            .unwrap()
            .unwrap();
        assert!(replies[0].text.contains("Ivan"));
        assert!(replies[0].text.contains("FastLine"));

        // The wizard keeps the entered name alongside the selected company
        match &slot {
            Some(Survey::AddDriver(AddDriverStep::Confirm { name, mc_name })) => {
                assert_eq!(name, "Ivan");
                assert_eq!(mc_name, "FastLine");
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_no_wizard_returns_none() {
        let conn = test_conn();
        let mut slot = None;
        assert!(handle_text(&mut slot, &conn, "hi").unwrap().is_none());

        // A cargo survey in the slot is not an admin wizard
        let mut slot = Some(Survey::Cargo(crate::survey::state::CargoSurvey::new()));
        assert!(handle_text(&mut slot, &conn, "hi").unwrap().is_none());
        assert!(handle_callback(&mut slot, &conn, &CallbackAction::ConfirmYes)
            .unwrap()
            .is_none());
    }
}
