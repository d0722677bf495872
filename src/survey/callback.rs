//! Typed parser for inline-keyboard callback payloads
//!
//! The wire format is a closed prefix convention:
//! `dispatcher_<name>`, `driver_<name>`, `mc_<name>`, `confirm_yes`,
//! `confirm_no`, `change_<field>`, `cancel_changes`. Anything else is
//! rejected explicitly instead of falling through.

use super::state::CargoField;

/// A recognized button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Dispatcher selected by name
    Dispatcher(String),
    /// Driver selected by name
    Driver(String),
    /// MC company selected by name
    Mc(String),
    ConfirmYes,
    ConfirmNo,
    /// Re-collect one field from the change menu
    Change(CargoField),
    /// Leave the change menu without touching anything
    CancelChanges,
}

impl CallbackAction {
    /// Parses a raw callback payload. Returns `None` for unknown payloads;
    /// the caller answers those with an explicit "unknown action".
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "confirm_yes" => return Some(CallbackAction::ConfirmYes),
            "confirm_no" => return Some(CallbackAction::ConfirmNo),
            "cancel_changes" => return Some(CallbackAction::CancelChanges),
            _ => {}
        }
        if let Some(name) = data.strip_prefix("dispatcher_") {
            return Some(CallbackAction::Dispatcher(name.to_string()));
        }
        if let Some(name) = data.strip_prefix("driver_") {
            return Some(CallbackAction::Driver(name.to_string()));
        }
        if let Some(name) = data.strip_prefix("mc_") {
            return Some(CallbackAction::Mc(name.to_string()));
        }
        if let Some(key) = data.strip_prefix("change_") {
            return CargoField::from_key(key).map(CallbackAction::Change);
        }
        None
    }
}

pub fn dispatcher_payload(name: &str) -> String {
    format!("dispatcher_{name}")
}

pub fn driver_payload(name: &str) -> String {
    format!("driver_{name}")
}

pub fn mc_payload(name: &str) -> String {
    format!("mc_{name}")
}

pub fn change_payload(field: CargoField) -> String {
    format!("change_{}", field.key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_selections() {
        assert_eq!(
            CallbackAction::parse("dispatcher_Dean Clark"),
            Some(CallbackAction::Dispatcher("Dean Clark".to_string()))
        );
        assert_eq!(
            CallbackAction::parse("driver_Ivan"),
            Some(CallbackAction::Driver("Ivan".to_string()))
        );
        assert_eq!(
            CallbackAction::parse("mc_FastLine"),
            Some(CallbackAction::Mc("FastLine".to_string()))
        );
    }

    #[test]
    fn test_parse_confirm_and_change() {
        assert_eq!(CallbackAction::parse("confirm_yes"), Some(CallbackAction::ConfirmYes));
        assert_eq!(CallbackAction::parse("confirm_no"), Some(CallbackAction::ConfirmNo));
        assert_eq!(
            CallbackAction::parse("cancel_changes"),
            Some(CallbackAction::CancelChanges)
        );
        assert_eq!(
            CallbackAction::parse("change_miles_empty"),
            Some(CallbackAction::Change(CargoField::MilesEmpty))
        );
    }

    #[test]
    fn test_unknown_payloads_rejected() {
        assert_eq!(CallbackAction::parse("change_bogus"), None);
        assert_eq!(CallbackAction::parse("subscribe:vip"), None);
        assert_eq!(CallbackAction::parse(""), None);
    }

    #[test]
    fn test_payloads_roundtrip_through_parser() {
        assert_eq!(
            CallbackAction::parse(&dispatcher_payload("Dean Clark")),
            Some(CallbackAction::Dispatcher("Dean Clark".to_string()))
        );
        assert_eq!(
            CallbackAction::parse(&change_payload(CargoField::Route)),
            Some(CallbackAction::Change(CargoField::Route))
        );
    }
}
