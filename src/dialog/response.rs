//! User responses and their JSON wire shape

use serde_json::{json, Value};

/// Dialog button identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Positive,
    Negative,
    Neutral,
}

impl Button {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

/// Terminal value produced by user interaction with a shown dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResponse {
    /// A button was pressed. Seek bars report their value alongside.
    Button {
        which: Button,
        progress: Option<i32>,
    },
    /// A plain list item was clicked
    Item(usize),
    /// Dismissed without an answer
    Canceled,
}

impl DialogResponse {
    /// Wire representation returned to remote callers
    ///
    /// - `{"which": "positive"}` (plus `"progress"` for seek bars)
    /// - `{"item": 1}`
    /// - `{"canceled": true}`
    pub fn to_json(&self) -> Value {
        match self {
            Self::Button {
                which,
                progress: Some(progress),
            } => json!({ "which": which.as_str(), "progress": progress }),
            Self::Button {
                which,
                progress: None,
            } => json!({ "which": which.as_str() }),
            Self::Item(index) => json!({ "item": index }),
            Self::Canceled => json!({ "canceled": true }),
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_json() {
        let response = DialogResponse::Button {
            which: Button::Negative,
            progress: None,
        };
        assert_eq!(response.to_json(), json!({"which": "negative"}));
    }

    #[test]
    fn test_seek_bar_button_carries_progress() {
        let response = DialogResponse::Button {
            which: Button::Positive,
            progress: Some(73),
        };
        assert_eq!(
            response.to_json(),
            json!({"which": "positive", "progress": 73})
        );
    }

    #[test]
    fn test_item_and_cancel_json() {
        assert_eq!(DialogResponse::Item(1).to_json(), json!({"item": 1}));
        assert_eq!(DialogResponse::Canceled.to_json(), json!({"canceled": true}));
        assert!(DialogResponse::Canceled.is_canceled());
        assert!(!DialogResponse::Item(0).is_canceled());
    }
}
