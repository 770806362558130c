use crate::store::backend::BackendEvent;

/// Stable identifier for one conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Session status gating which view variant renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppStatus {
    #[default]
    Idle,
    Loading,
    Answering,
    Error,
    Done,
}

impl AppStatus {
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true while a backend request is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Loading | Self::Answering)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

/// One conversation entry. Entry zero of a conversation is the summary answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// Names of the sources cited by this entry.
    pub sources: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn new(id: MessageId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            sources: None,
        }
    }

    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content)
    }

    /// Creates an empty assistant entry that backend deltas stream into.
    pub fn assistant_pending(id: MessageId) -> Self {
        Self::new(id, Role::Assistant, String::new())
    }

    fn cite(&mut self, name: &str) {
        let sources = self.sources.get_or_insert_with(Vec::new);
        if !sources.iter().any(|cited| cited == name) {
            sources.push(name.to_string());
        }
    }
}

/// Citation record with its panel display state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub page_content: Option<String>,
    pub expanded: bool,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            summary: None,
            page_content: None,
            expanded: false,
        }
    }

    /// Decodes a backend source payload: document metadata merged with `page_content`.
    ///
    /// An empty object is how the backend reports that no documents matched, so it
    /// yields `None`, as does any payload without a usable `name`.
    pub fn from_payload(payload: &serde_json::Value) -> Option<Self> {
        let object = payload.as_object()?;
        let name = object.get("name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }

        let text_field = |key: &str| {
            object
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            name: name.to_string(),
            url: text_field("url"),
            summary: text_field("summary"),
            page_content: text_field("page_content"),
            expanded: false,
        })
    }
}

/// Durable session state owned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    status: AppStatus,
    sources: Vec<Source>,
    conversation: Vec<ChatMessage>,
    session_id: Option<String>,
    error: Option<String>,
    next_message_id: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> AppStatus {
        self.status
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn conversation(&self) -> &[ChatMessage] {
        &self.conversation
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn summary(&self) -> Option<&ChatMessage> {
        self.conversation.first()
    }

    /// Turn-by-turn entries following the summary.
    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.get(1..).unwrap_or(&[])
    }

    pub fn has_summary(&self) -> bool {
        self.summary()
            .is_some_and(|summary| !summary.content.is_empty())
    }

    /// Starts a fresh search, discarding the previous conversation and sources.
    pub fn begin_search(&mut self) {
        self.sources.clear();
        self.session_id = None;
        self.error = None;
        self.conversation.clear();
        let summary_id = self.alloc_message_id();
        self.conversation
            .push(ChatMessage::assistant_pending(summary_id));
        self.status = AppStatus::Loading;
    }

    /// Appends a follow-up question and its pending answer.
    ///
    /// Returns false when the question is blank or a request is already in flight.
    pub fn begin_follow_up(&mut self, question: &str) -> bool {
        if question.trim().is_empty() || self.status.is_busy() {
            return false;
        }

        let question_id = self.alloc_message_id();
        let answer_id = self.alloc_message_id();
        self.conversation.push(ChatMessage::user(question_id, question));
        self.conversation
            .push(ChatMessage::assistant_pending(answer_id));
        self.error = None;
        self.status = AppStatus::Loading;
        true
    }

    /// Settles an in-flight request. Without any answer text there is nothing to
    /// show, so the session falls back to `Idle`.
    pub fn abort(&mut self) {
        if !self.status.is_busy() {
            return;
        }

        self.status = if !self.has_summary() {
            AppStatus::Idle
        } else {
            AppStatus::Done
        };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.status = AppStatus::Error;
    }

    /// Sets the named source's expanded flag, or flips it when `expanded` is `None`.
    ///
    /// Returns false when no source carries that name.
    pub fn toggle_source(&mut self, name: &str, expanded: Option<bool>) -> bool {
        let Some(source) = self.sources.iter_mut().find(|source| source.name == name) else {
            return false;
        };

        source.expanded = expanded.unwrap_or(!source.expanded);
        true
    }

    pub fn apply_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Session(session_id) => {
                self.session_id = Some(session_id);
            }
            BackendEvent::Source(source) => self.add_source(source),
            BackendEvent::Delta(text) => {
                if let Some(answer) = self.current_answer_mut() {
                    answer.content.push_str(&text);
                }
                self.status = AppStatus::Answering;
            }
            BackendEvent::Done => {
                self.status = AppStatus::Done;
            }
            BackendEvent::Error(message) => self.fail(message),
        }
    }

    fn add_source(&mut self, source: Source) {
        let name = source.name.clone();
        if !self.sources.iter().any(|known| known.name == name) {
            self.sources.push(source);
        }

        if let Some(answer) = self.current_answer_mut() {
            answer.cite(&name);
        }
    }

    fn current_answer_mut(&mut self) -> Option<&mut ChatMessage> {
        self.conversation
            .last_mut()
            .filter(|message| message.role == Role::Assistant)
    }

    fn alloc_message_id(&mut self) -> MessageId {
        self.next_message_id = self.next_message_id.saturating_add(1);
        MessageId::new(self.next_message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answered_search() -> AppState {
        let mut state = AppState::new();
        state.begin_search();
        state.apply_event(BackendEvent::Session("session-1".to_string()));
        state.apply_event(BackendEvent::Source(Source::new("budget-law")));
        state.apply_event(BackendEvent::Delta("The budget ".to_string()));
        state.apply_event(BackendEvent::Delta("passed.".to_string()));
        state.apply_event(BackendEvent::Done);
        state
    }

    #[test]
    fn has_summary_requires_non_empty_first_entry() {
        let mut state = AppState::new();
        assert!(!state.has_summary());

        state.begin_search();
        assert!(state.summary().is_some());
        assert!(!state.has_summary());

        state.apply_event(BackendEvent::Delta("answer".to_string()));
        assert!(state.has_summary());
    }

    #[test]
    fn search_streams_into_summary_and_cites_sources() {
        let state = answered_search();

        assert_eq!(state.status(), AppStatus::Done);
        assert_eq!(state.session_id(), Some("session-1"));
        assert_eq!(state.sources().len(), 1);
        assert!(state.messages().is_empty());

        let summary = state.summary().expect("summary entry");
        assert_eq!(summary.content, "The budget passed.");
        assert_eq!(summary.sources, Some(vec!["budget-law".to_string()]));
    }

    #[test]
    fn first_delta_moves_status_to_answering() {
        let mut state = AppState::new();
        state.begin_search();
        assert_eq!(state.status(), AppStatus::Loading);

        state.apply_event(BackendEvent::Delta("a".to_string()));
        assert_eq!(state.status(), AppStatus::Answering);
    }

    #[test]
    fn duplicate_sources_are_kept_once() {
        let mut state = AppState::new();
        state.begin_search();
        state.apply_event(BackendEvent::Source(Source::new("doc")));
        state.apply_event(BackendEvent::Source(Source::new("doc")));

        assert_eq!(state.sources().len(), 1);
        assert_eq!(
            state.summary().and_then(|summary| summary.sources.clone()),
            Some(vec!["doc".to_string()])
        );
    }

    #[test]
    fn new_search_discards_previous_conversation() {
        let mut state = answered_search();
        assert!(state.begin_follow_up("and then?"));
        state.apply_event(BackendEvent::Done);

        state.begin_search();

        assert_eq!(state.conversation().len(), 1);
        assert!(state.sources().is_empty());
        assert_eq!(state.session_id(), None);
        assert_eq!(state.status(), AppStatus::Loading);
    }

    #[test]
    fn follow_up_appends_question_and_pending_answer() {
        let mut state = answered_search();

        assert!(state.begin_follow_up("Who signed it?"));
        let messages = state.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Who signed it?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[1].content.is_empty());

        state.apply_event(BackendEvent::Delta("The minister.".to_string()));
        assert_eq!(state.messages()[1].content, "The minister.");
        assert_eq!(
            state.summary().map(|summary| summary.content.as_str()),
            Some("The budget passed.")
        );
    }

    #[test]
    fn follow_up_is_rejected_when_blank_or_busy() {
        let mut state = answered_search();
        assert!(!state.begin_follow_up("   "));

        assert!(state.begin_follow_up("first"));
        assert!(!state.begin_follow_up("second"));
        assert_eq!(state.messages().len(), 2);
    }

    #[test]
    fn abort_before_any_answer_text_returns_to_idle() {
        let mut state = AppState::new();
        state.begin_search();
        state.apply_event(BackendEvent::Source(Source::new("doc")));
        state.abort();
        assert_eq!(state.status(), AppStatus::Idle);
        assert!(!state.has_summary());

        let mut idle = AppState::new();
        idle.abort();
        assert_eq!(idle.status(), AppStatus::Idle);
    }

    #[test]
    fn abort_after_summary_keeps_answer_and_settles_done() {
        let mut state = AppState::new();
        state.begin_search();
        state.apply_event(BackendEvent::Delta("partial".to_string()));
        state.abort();
        assert_eq!(state.status(), AppStatus::Done);

        let mut state = answered_search();
        assert!(state.begin_follow_up("and then?"));
        state.abort();
        assert_eq!(state.status(), AppStatus::Done);
        assert_eq!(state.messages().len(), 2);
    }

    #[test]
    fn abort_is_ignored_when_not_busy() {
        let mut state = answered_search();
        state.fail("boom");
        state.abort();
        assert_eq!(state.status(), AppStatus::Error);
    }

    #[test]
    fn error_event_records_message() {
        let mut state = AppState::new();
        state.begin_search();
        state.apply_event(BackendEvent::Error("index unavailable".to_string()));

        assert_eq!(state.status(), AppStatus::Error);
        assert_eq!(state.error(), Some("index unavailable"));
    }

    #[test]
    fn toggle_source_sets_or_flips_expanded_flag() {
        let mut state = answered_search();

        assert!(state.toggle_source("budget-law", Some(true)));
        assert!(state.sources()[0].expanded);
        assert!(state.toggle_source("budget-law", Some(true)));
        assert!(state.sources()[0].expanded);
        assert!(state.toggle_source("budget-law", None));
        assert!(!state.sources()[0].expanded);
        assert!(!state.toggle_source("missing", None));
    }

    #[test]
    fn source_payload_requires_name() {
        let payload = serde_json::json!({
            "name": "Decision 1024",
            "url": "https://example.org/decisions/1024",
            "category": "decision",
            "page_content": "The government decided...",
        });
        let source = Source::from_payload(&payload).expect("named payload");
        assert_eq!(source.name, "Decision 1024");
        assert_eq!(source.url.as_deref(), Some("https://example.org/decisions/1024"));
        assert_eq!(source.summary, None);
        assert!(!source.expanded);

        assert_eq!(Source::from_payload(&serde_json::json!({})), None);
        assert_eq!(Source::from_payload(&serde_json::json!({ "name": "  " })), None);
        assert_eq!(Source::from_payload(&serde_json::json!("name")), None);
    }
}
