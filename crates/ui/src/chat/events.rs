use gpui::SharedString;

/// Emitted when a citation inside an answer is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceClicked {
    pub name: SharedString,
}

/// Emitted when the expand/collapse control of a source panel row is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceToggled {
    pub name: SharedString,
}

/// Emitted when the user sends a follow-up question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpSubmitted {
    pub content: String,
}

/// Emitted when the user asks to stop the in-flight answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbortRequested;

impl SourceClicked {
    pub fn new(name: impl Into<SharedString>) -> Self {
        Self { name: name.into() }
    }
}

impl FollowUpSubmitted {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}
