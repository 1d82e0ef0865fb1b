//! Internal turn types

/// Response text plus the record-changed signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub text: String,
    pub record_changed: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            record_changed: false,
        }
    }

    pub fn changed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            record_changed: true,
        }
    }
}

/// Who and where a turn happens
#[derive(Debug, Clone, Copy)]
pub(crate) struct TurnScope<'a> {
    pub user_id: &'a str,
    pub conversation_id: &'a str,
}
