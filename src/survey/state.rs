//! Typed per-conversation survey state
//!
//! Every wizard kind is a variant of [`Survey`], so a conversation slot can
//! hold exactly one in-flight survey and admin wizards are keyed by chat id
//! like everything else. Admin steps carry their scratch fields inside the
//! variant, which makes half-filled wizard states unrepresentable.

use uuid::Uuid;

/// Current question of the cargo intake survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CargoStep {
    Number,
    Dispatcher,
    Driver,
    Mc,
    MilesEmpty,
    MilesLoaded,
    Cost,
    Route,
    /// All fields collected, waiting for yes/no
    Confirm,
    /// "no" was pressed, waiting for a field choice
    ChangeField,
}

/// Editable cargo fields offered in the change-field menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CargoField {
    Number,
    Dispatcher,
    Driver,
    Mc,
    MilesEmpty,
    MilesLoaded,
    Cost,
    Route,
}

impl CargoField {
    pub const ALL: [CargoField; 8] = [
        CargoField::Number,
        CargoField::Dispatcher,
        CargoField::Driver,
        CargoField::Mc,
        CargoField::MilesEmpty,
        CargoField::MilesLoaded,
        CargoField::Cost,
        CargoField::Route,
    ];

    /// Stable key used in `change_<field>` callback payloads.
    pub fn key(self) -> &'static str {
        match self {
            CargoField::Number => "number",
            CargoField::Dispatcher => "dispatcher",
            CargoField::Driver => "driver",
            CargoField::Mc => "mc",
            CargoField::MilesEmpty => "miles_empty",
            CargoField::MilesLoaded => "miles_loaded",
            CargoField::Cost => "cost",
            CargoField::Route => "route",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Button label in the change-field menu.
    pub fn label(self) -> &'static str {
        match self {
            CargoField::Number => "Номер",
            CargoField::Dispatcher => "Диспетчер",
            CargoField::Driver => "Водитель",
            CargoField::Mc => "MC компания",
            CargoField::MilesEmpty => "Мили пустым",
            CargoField::MilesLoaded => "Мили с грузом",
            CargoField::Cost => "Оплата",
            CargoField::Route => "Маршрут",
        }
    }

    /// Survey step that collects this field.
    pub fn step(self) -> CargoStep {
        match self {
            CargoField::Number => CargoStep::Number,
            CargoField::Dispatcher => CargoStep::Dispatcher,
            CargoField::Driver => CargoStep::Driver,
            CargoField::Mc => CargoStep::Mc,
            CargoField::MilesEmpty => CargoStep::MilesEmpty,
            CargoField::MilesLoaded => CargoStep::MilesLoaded,
            CargoField::Cost => CargoStep::Cost,
            CargoField::Route => CargoStep::Route,
        }
    }
}

/// Partial cargo being collected, one field per answered question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CargoDraft {
    pub number: Option<String>,
    pub dispatcher_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub mc_id: Option<Uuid>,
    pub miles_empty: Option<f64>,
    pub miles_loaded: Option<f64>,
    pub cost: Option<f64>,
    pub route: Option<String>,
}

/// In-flight cargo intake survey for one conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct CargoSurvey {
    pub step: CargoStep,
    /// Set while re-collecting a single field from the change menu; a valid
    /// answer then returns straight to [`CargoStep::Confirm`].
    pub editing: bool,
    pub draft: CargoDraft,
}

impl CargoSurvey {
    pub fn new() -> Self {
        Self {
            step: CargoStep::Number,
            editing: false,
            draft: CargoDraft::default(),
        }
    }
}

impl Default for CargoSurvey {
    fn default() -> Self {
        Self::new()
    }
}

/// Add-dispatcher wizard: name → percent → confirm.
#[derive(Debug, Clone, PartialEq)]
pub enum AddDispatcherStep {
    Name,
    Percent { name: String },
    Confirm { name: String, percent: f64 },
}

/// Add-MC wizard: name → confirm.
#[derive(Debug, Clone, PartialEq)]
pub enum AddMcStep {
    Name,
    Confirm { name: String },
}

/// Add-driver wizard: name → MC selection → confirm.
#[derive(Debug, Clone, PartialEq)]
pub enum AddDriverStep {
    Name,
    Mc { name: String },
    Confirm { name: String, mc_name: String },
}

/// One in-flight survey of any kind, stored per conversation id.
#[derive(Debug, Clone, PartialEq)]
pub enum Survey {
    Cargo(CargoSurvey),
    AddDispatcher(AddDispatcherStep),
    AddMc(AddMcStep),
    AddDriver(AddDriverStep),
}

impl Survey {
    /// True for the admin data-entry wizards (not the cargo intake survey).
    pub fn is_admin_wizard(&self) -> bool {
        matches!(
            self,
            Survey::AddDispatcher(_) | Survey::AddMc(_) | Survey::AddDriver(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_roundtrip() {
        for field in CargoField::ALL {
            assert_eq!(CargoField::from_key(field.key()), Some(field));
        }
        assert_eq!(CargoField::from_key("nope"), None);
    }

    #[test]
    fn test_new_survey_starts_at_number() {
        let survey = CargoSurvey::new();
        assert_eq!(survey.step, CargoStep::Number);
        assert!(!survey.editing);
        assert_eq!(survey.draft, CargoDraft::default());
    }
}
