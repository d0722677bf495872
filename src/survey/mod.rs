//! Survey engine: multi-step guided data collection over a chat channel
//!
//! The engine never talks to Telegram directly. Handlers feed it inbound text
//! or parsed button actions together with the conversation's state slot, and it
//! returns [`Reply`] values which the telegram layer renders as messages and
//! inline keyboards. That keeps the whole state machine testable without a
//! network.

pub mod admin;
pub mod callback;
pub mod cargo;
pub mod state;
pub mod store;

pub use callback::CallbackAction;
pub use state::{CargoField, CargoStep, CargoSurvey, Survey};
pub use store::SurveyStore;

/// One outbound message: text plus an optional choice menu.
///
/// Menu rows are (label, callback payload) pairs; the telegram layer turns
/// them into an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub menu: Option<Vec<Vec<(String, String)>>>,
}

impl Reply {
    /// Plain text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: None,
        }
    }

    /// Text with an attached choice menu
    pub fn menu(text: impl Into<String>, rows: Vec<Vec<(String, String)>>) -> Self {
        Self {
            text: text.into(),
            menu: Some(rows),
        }
    }
}

/// Groups options into keyboard rows of two buttons.
pub(crate) fn rows_of_two(options: Vec<(String, String)>) -> Vec<Vec<(String, String)>> {
    let mut rows = Vec::new();
    let mut current = Vec::new();
    for option in options {
        current.push(option);
        if current.len() == 2 {
            rows.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Parses user input as a finite non-negative number.
///
/// Accepts a decimal comma as well, since the operators type Russian-locale
/// numbers.
pub(crate) fn parse_non_negative(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative("50"), Some(50.0));
        assert_eq!(parse_non_negative(" 1.5 "), Some(1.5));
        assert_eq!(parse_non_negative("1,5"), Some(1.5));
        assert_eq!(parse_non_negative("-3"), None);
        assert_eq!(parse_non_negative("abc"), None);
        assert_eq!(parse_non_negative("NaN"), None);
        assert_eq!(parse_non_negative("inf"), None);
        assert_eq!(parse_non_negative(""), None);
    }

    #[test]
    fn test_rows_of_two() {
        let options = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
        ];
        let rows = rows_of_two(options);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 1);
    }
}
