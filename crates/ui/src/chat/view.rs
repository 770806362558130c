use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, v_flex};

use crate::chat::answer_message::AnswerMessage;
use crate::chat::events::{AbortRequested, FollowUpSubmitted, SourceClicked};
use crate::chat::message_input::MessageInput;
use crate::chat::scroll_manager::ScrollManager;
use crate::store::{AppState, AppStatus, ChatMessage, Role};

const USER_BUBBLE_MAX_WIDTH: Pixels = px(540.);
const USER_BUBBLE_PADDING_X: Pixels = px(14.);
const USER_BUBBLE_PADDING_Y: Pixels = px(10.);

/// Transcript of the summary answer and follow-up turns, plus the follow-up input.
pub struct ChatView {
    summary: Option<ChatMessage>,
    messages: Vec<ChatMessage>,
    status: AppStatus,
    error: Option<String>,
    message_input: Entity<MessageInput>,
    scroll_manager: ScrollManager,
}

// Follow-up and abort events are re-emitted from the input; citations come from answers.
impl EventEmitter<SourceClicked> for ChatView {}
impl EventEmitter<FollowUpSubmitted> for ChatView {}
impl EventEmitter<AbortRequested> for ChatView {}

impl ChatView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.subscribe(&message_input, |_, _, event: &FollowUpSubmitted, cx| {
            cx.emit(event.clone());
        })
        .detach();

        cx.subscribe(&message_input, |_, _, _event: &AbortRequested, cx| {
            cx.emit(AbortRequested);
        })
        .detach();

        Self {
            summary: None,
            messages: Vec::new(),
            status: AppStatus::Idle,
            error: None,
            message_input,
            scroll_manager: ScrollManager::new(),
        }
    }

    /// Mirrors the store's conversation into the transcript.
    ///
    /// A new summary entry means a new search, which resets scroll following.
    /// Otherwise growth while an answer streams keeps the view pinned to the bottom.
    pub fn set_conversation(&mut self, state: &AppState, cx: &mut Context<Self>) {
        let summary = state.summary().cloned();
        let messages = state.messages();
        let status = state.status();
        let error = state.error().map(str::to_string);

        if self.summary == summary
            && self.messages == messages
            && self.status == status
            && self.error == error
        {
            return;
        }

        let session_changed =
            self.summary.as_ref().map(|summary| summary.id) != summary.as_ref().map(|s| s.id);
        if session_changed {
            self.scroll_manager.reset();
        } else if messages.len() > self.messages.len() || status.is_busy() {
            self.scroll_manager.request_scroll_to_bottom_if_following();
        }

        self.summary = summary;
        self.messages = messages.to_vec();
        self.status = status;
        self.error = error;

        self.message_input.update(cx, |input, cx| {
            input.set_busy(status.is_busy(), cx);
        });
        cx.notify();
    }

    fn render_user_message(&self, message: &ChatMessage, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .w_full()
            .items_end()
            .child(
                div()
                    .max_w(USER_BUBBLE_MAX_WIDTH)
                    .px(USER_BUBBLE_PADDING_X)
                    .py(USER_BUBBLE_PADDING_Y)
                    .rounded_lg()
                    .bg(theme.accent)
                    .text_color(theme.accent_foreground)
                    .child(Label::new(message.content.clone()).text_sm()),
            )
            .into_any_element()
    }

    /// Renders an assistant entry. An empty latest entry shows a status label instead.
    fn render_answer(&self, message: &ChatMessage, compact: bool, cx: &Context<Self>) -> AnyElement {
        if message.content.is_empty() && self.is_latest(message) {
            let waiting_label = match self.status {
                AppStatus::Loading | AppStatus::Answering => "Waiting for response...",
                AppStatus::Error => "No answer was produced.",
                AppStatus::Idle | AppStatus::Done => "(empty response)",
            };

            return Label::new(waiting_label)
                .text_sm()
                .text_color(cx.theme().muted_foreground)
                .into_any_element();
        }

        AnswerMessage::new(
            SharedString::from(format!("answer-{}", message.id.0)),
            Some(SharedString::from(message.content.clone())),
            message.sources.as_ref().map(|names| {
                names
                    .iter()
                    .map(|name| SharedString::from(name.clone()))
                    .collect()
            }),
        )
        .compact(compact)
        .on_source_click(cx.listener(|_, event: &SourceClicked, _window, cx| {
            cx.emit(event.clone());
        }))
        .into_any_element()
    }

    fn render_message(&self, message: &ChatMessage, cx: &Context<Self>) -> AnyElement {
        match message.role {
            Role::User => self.render_user_message(message, cx),
            Role::Assistant => self.render_answer(message, true, cx),
        }
    }

    /// Whether `message` is the entry backend deltas currently stream into.
    fn is_latest(&self, message: &ChatMessage) -> bool {
        self.messages
            .last()
            .or(self.summary.as_ref())
            .is_some_and(|latest| latest.id == message.id)
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll_manager.update_follow_state();
        self.scroll_manager.apply_pending_scroll();

        let theme = cx.theme();
        let summary = self
            .summary
            .as_ref()
            .map(|summary| self.render_answer(summary, false, cx));
        let turns = self
            .messages
            .iter()
            .map(|message| self.render_message(message, cx))
            .collect::<Vec<_>>();
        let error = (self.status == AppStatus::Error)
            .then(|| self.error.clone())
            .flatten();

        v_flex()
            .id("chat-view")
            .size_full()
            .min_h_0()
            .child(
                div()
                    .id("chat-transcript")
                    .flex_1()
                    .min_h_0()
                    .overflow_y_scroll()
                    .track_scroll(self.scroll_manager.handle())
                    .child(
                        v_flex()
                            .w_full()
                            .gap_4()
                            .py_3()
                            .children(summary)
                            .children(turns)
                            .when_some(error, |column, error| {
                                column.child(
                                    h_flex().w_full().child(
                                        Label::new(format!("Error: {error}"))
                                            .text_xs()
                                            .text_color(theme.danger),
                                    ),
                                )
                            }),
                    ),
            )
            .child(
                div()
                    .id("chat-follow-up")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}
