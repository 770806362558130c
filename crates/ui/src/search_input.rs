use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use crate::store::AppStatus;

/// Emitted when the search form is submitted with a non-blank query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSubmitted {
    pub query: String,
}

/// Which action button the search box shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAffordance {
    Submit { enabled: bool },
    /// Shown once a search ran; routes through the same submit path.
    Reset,
}

/// Local text of the search box, kept apart from the query the store last saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDraft {
    text: String,
    external_value: String,
}

impl QueryDraft {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            text: value.clone(),
            external_value: value,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Adopts a new externally supplied value.
    ///
    /// Returns the text to display when the value changed, `None` when it did not.
    pub fn sync_external(&mut self, value: &str) -> Option<&str> {
        if self.external_value == value {
            return None;
        }

        self.external_value = value.to_string();
        self.text = value.to_string();
        Some(&self.text)
    }

    /// The query to search for, or `None` when the text is blank.
    pub fn submission(&self) -> Option<&str> {
        if self.text.trim().is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    pub fn affordance(&self, status: AppStatus) -> SearchAffordance {
        if status.is_idle() {
            SearchAffordance::Submit {
                enabled: self.submission().is_some(),
            }
        } else {
            SearchAffordance::Reset
        }
    }
}

/// Controlled search field at the top of the window.
pub struct SearchInput {
    input_state: Entity<InputState>,
    draft: QueryDraft,
    status: AppStatus,
}

impl EventEmitter<SearchSubmitted> for SearchInput {}

impl SearchInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state =
            cx.new(|cx| InputState::new(window, cx).placeholder("What would you like to ask?"));

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, _window, cx| {
                let text = this.input_state.read(cx).value().to_string();
                this.draft.set_text(text);

                if let InputEvent::PressEnter { .. } = event {
                    this.handle_submit(cx);
                }
                cx.notify();
            },
        )
        .detach();

        Self {
            input_state,
            draft: QueryDraft::default(),
            status: AppStatus::Idle,
        }
    }

    /// Replaces the displayed text when the externally supplied value changes.
    pub fn set_value(&mut self, value: &str, window: &mut Window, cx: &mut Context<Self>) {
        let Some(text) = self.draft.sync_external(value).map(str::to_string) else {
            return;
        };

        self.input_state.update(cx, |state, cx| {
            state.set_value(text, window, cx);
        });
        cx.notify();
    }

    pub fn set_status(&mut self, status: AppStatus, cx: &mut Context<Self>) {
        if self.status != status {
            self.status = status;
            cx.notify();
        }
    }

    fn handle_submit(&mut self, cx: &mut Context<Self>) {
        let Some(query) = self.draft.submission() else {
            return;
        };

        cx.emit(SearchSubmitted {
            query: query.to_string(),
        });
    }
}

impl Render for SearchInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        let action = match self.draft.affordance(self.status) {
            SearchAffordance::Submit { enabled } => Button::new("search-submit")
                .primary()
                .icon(IconName::ArrowRight)
                .disabled(!enabled)
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.handle_submit(cx);
                })),
            SearchAffordance::Reset => Button::new("search-reset")
                .outline()
                .icon(IconName::Redo)
                .child("Start over")
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.handle_submit(cx);
                })),
        };

        h_flex()
            .id("search-input")
            .w_full()
            .h_14()
            .gap_2()
            .px_3()
            .items_center()
            .rounded_md()
            .border_2()
            .border_color(theme.border)
            .bg(theme.background)
            .child(
                Icon::new(IconName::Search)
                    .size(px(16.))
                    .text_color(theme.muted_foreground),
            )
            .child(
                div()
                    .flex_1()
                    .min_w_0()
                    .child(Input::new(&self.input_state).w_full()),
            )
            .child(action)
    }
}
