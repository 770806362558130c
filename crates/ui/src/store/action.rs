use std::time::Duration;

/// Delay between expanding a clicked source and scrolling it into view.
pub const SOURCE_SCROLL_DELAY: Duration = Duration::from_millis(300);

/// Everything the views can ask the store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Search(String),
    AskQuestion(String),
    AbortRequest,
    /// `expanded: None` flips the current flag.
    SourceToggle {
        name: String,
        expanded: Option<bool>,
    },
}

impl Action {
    pub fn search(query: impl Into<String>) -> Self {
        Self::Search(query.into())
    }

    pub fn ask_question(query: impl Into<String>) -> Self {
        Self::AskQuestion(query.into())
    }

    pub fn source_toggle(name: impl Into<String>, expanded: Option<bool>) -> Self {
        Self::SourceToggle {
            name: name.into(),
            expanded,
        }
    }
}

/// Effects of clicking a citation: expand the source now, scroll to it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceClick {
    pub toggle: Action,
    pub scroll_to: String,
    pub delay: Duration,
}

impl SourceClick {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            toggle: Action::source_toggle(name.clone(), Some(true)),
            scroll_to: name,
            delay: SOURCE_SCROLL_DELAY,
        }
    }
}
