use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use crate::chat::events::{AbortRequested, FollowUpSubmitted};

/// Button shown next to the follow-up field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowUpAction {
    Send { enabled: bool },
    Stop,
}

impl FollowUpAction {
    fn resolve(text: &str, busy: bool) -> Self {
        if busy {
            Self::Stop
        } else {
            Self::Send {
                enabled: follow_up_submission(text, busy).is_some(),
            }
        }
    }
}

/// The question to send, or `None` while busy or when the text is blank.
fn follow_up_submission(text: &str, busy: bool) -> Option<&str> {
    (!busy && !text.trim().is_empty()).then_some(text)
}

/// Follow-up question box under the transcript.
pub struct MessageInput {
    input_state: Entity<InputState>,
    text: String,
    is_busy: bool,
}

impl EventEmitter<FollowUpSubmitted> for MessageInput {}
impl EventEmitter<AbortRequested> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Ask a follow-up question...")
                .clean_on_escape()
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| {
                this.text = this.input_state.read(cx).value().to_string();

                if let InputEvent::PressEnter { .. } = event {
                    this.handle_submit(window, cx);
                }
                cx.notify();
            },
        )
        .detach();

        Self {
            input_state,
            text: String::new(),
            is_busy: false,
        }
    }

    pub fn set_busy(&mut self, busy: bool, cx: &mut Context<Self>) {
        if self.is_busy != busy {
            self.is_busy = busy;
            cx.notify();
        }
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        self.text.clear();
    }

    fn handle_submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let Some(content) = follow_up_submission(&self.text, self.is_busy).map(str::to_string)
        else {
            return;
        };

        cx.emit(FollowUpSubmitted::new(content));
        self.clear(window, cx);
    }

    fn handle_stop(&mut self, cx: &mut Context<Self>) {
        if self.is_busy {
            cx.emit(AbortRequested);
        }
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let action = match FollowUpAction::resolve(&self.text, self.is_busy) {
            FollowUpAction::Stop => Button::new("follow-up-stop")
                .small()
                .danger()
                .icon(IconName::CircleX)
                .child("Stop")
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.handle_stop(cx);
                })),
            FollowUpAction::Send { enabled } => Button::new("follow-up-send")
                .small()
                .primary()
                .icon(IconName::ArrowUp)
                .child("Send")
                .disabled(!enabled)
                .on_click(cx.listener(|this, _, window, cx| {
                    this.handle_submit(window, cx);
                })),
        };

        h_flex()
            .id("follow-up-input")
            .w_full()
            .gap_2()
            .py_3()
            .items_center()
            .bg(theme.background)
            .child(
                div()
                    .flex_1()
                    .min_w_0()
                    .child(Input::new(&self.input_state).w_full().disabled(self.is_busy)),
            )
            .child(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn blank_follow_up_is_never_sent() {
        assert_eq!(follow_up_submission("", false), None);
        assert_eq!(follow_up_submission(" \n ", false), None);
        assert_eq!(follow_up_submission("who voted?", false), Some("who voted?"));
    }

    #[::core::prelude::v1::test]
    fn follow_up_waits_for_the_running_answer() {
        assert_eq!(follow_up_submission("who voted?", true), None);
    }

    #[::core::prelude::v1::test]
    fn busy_input_offers_stop_instead_of_send() {
        assert_eq!(FollowUpAction::resolve("anything", true), FollowUpAction::Stop);
        assert_eq!(FollowUpAction::resolve("", true), FollowUpAction::Stop);
        assert_eq!(
            FollowUpAction::resolve("", false),
            FollowUpAction::Send { enabled: false }
        );
        assert_eq!(
            FollowUpAction::resolve("and after that?", false),
            FollowUpAction::Send { enabled: true }
        );
    }
}
