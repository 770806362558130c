use std::rc::Rc;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    text::TextView,
    v_flex,
};

use crate::chat::events::SourceClicked;

const MARKDOWN_SAFE_FALLBACK_THRESHOLD_BYTES: usize = 128 * 1024;

type SourceClickHandler = Rc<dyn Fn(&SourceClicked, &mut Window, &mut App)>;

/// How the answer text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerBody {
    Markdown,
    PlainText,
}

/// Stateless rendering of one answer and the sources it cites.
#[derive(IntoElement)]
pub struct AnswerMessage {
    id: SharedString,
    text: Option<SharedString>,
    sources: Option<Vec<SharedString>>,
    compact: bool,
    on_source_click: Option<SourceClickHandler>,
}

impl AnswerMessage {
    pub fn new(
        id: impl Into<SharedString>,
        text: Option<SharedString>,
        sources: Option<Vec<SharedString>>,
    ) -> Self {
        Self {
            id: id.into(),
            text,
            sources,
            compact: false,
            on_source_click: None,
        }
    }

    /// Drops the "Answer" heading, used for follow-up turns.
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn on_source_click(
        mut self,
        handler: impl Fn(&SourceClicked, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_source_click = Some(Rc::new(handler));
        self
    }

    pub fn body(&self) -> Option<AnswerBody> {
        let text = self.text.as_ref().filter(|text| !text.is_empty())?;
        if text.len() > MARKDOWN_SAFE_FALLBACK_THRESHOLD_BYTES {
            Some(AnswerBody::PlainText)
        } else {
            Some(AnswerBody::Markdown)
        }
    }

    pub fn source_list(&self) -> Option<&[SharedString]> {
        self.sources
            .as_deref()
            .filter(|sources| !sources.is_empty())
    }

    fn render_body(&self, body: AnswerBody, text: SharedString) -> AnyElement {
        match body {
            // Oversized payloads skip markdown parsing to keep layout predictable.
            AnswerBody::PlainText => Label::new(text).text_sm().into_any_element(),
            AnswerBody::Markdown => {
                let markdown_id =
                    ElementId::Name(SharedString::from(format!("{}-markdown", self.id)));
                TextView::markdown(markdown_id, text.to_string())
                    .selectable(true)
                    .into_any_element()
            }
        }
    }

    fn render_sources(&self, names: Vec<SharedString>, cx: &App) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .w_full()
            .gap_2()
            .child(
                Label::new("Sources")
                    .text_sm()
                    .font_weight(FontWeight::SEMIBOLD),
            )
            .child(
                Label::new("Answers are generated and may be inaccurate. Check the cited sources.")
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
            .child(
                h_flex()
                    .flex_wrap()
                    .gap_2()
                    .children(names.into_iter().enumerate().map(|(index, name)| {
                        let handler = self.on_source_click.clone();
                        let event = SourceClicked::new(name.clone());

                        Button::new(format!("answer-source-{index}"))
                            .ghost()
                            .small()
                            .icon(IconName::BookOpen)
                            .child(name)
                            .on_click(move |_, window, cx| {
                                if let Some(handler) = handler.as_ref() {
                                    handler(&event, window, cx);
                                }
                            })
                    })),
            )
    }
}

impl RenderOnce for AnswerMessage {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = cx.theme();
        let muted = theme.muted_foreground;
        let body = self.body();
        let text = self.text.clone();
        let sources = self.source_list().map(<[SharedString]>::to_vec);

        v_flex()
            .id(self.id.clone())
            .w_full()
            .gap_4()
            .when(!self.compact, |column| {
                column.child(
                    v_flex()
                        .child(
                            Label::new("Answer:")
                                .text_xl()
                                .font_weight(FontWeight::BOLD),
                        )
                        .child(
                            Label::new("Grounded in the indexed documents")
                                .text_xs()
                                .text_color(muted),
                        ),
                )
            })
            .when_some(body.zip(text), |column, (body, text)| {
                column.child(self.render_body(body, text))
            })
            .when_some(sources, |column, names| {
                column.child(self.render_sources(names, cx))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: Option<&str>, sources: Option<Vec<&str>>) -> AnswerMessage {
        AnswerMessage::new(
            "answer",
            text.map(|text| SharedString::from(text.to_string())),
            sources.map(|names| {
                names
                    .into_iter()
                    .map(|name| SharedString::from(name.to_string()))
                    .collect()
            }),
        )
    }

    #[::core::prelude::v1::test]
    fn absent_sources_render_no_source_list() {
        assert!(answer(Some("text"), None).source_list().is_none());
        assert!(answer(Some("text"), Some(Vec::new())).source_list().is_none());
    }

    #[::core::prelude::v1::test]
    fn source_list_keeps_citation_order() {
        let message = answer(None, Some(vec!["b", "a"]));
        let names = message
            .source_list()
            .map(|names| names.iter().map(|name| name.to_string()).collect::<Vec<_>>());
        assert_eq!(names, Some(vec!["b".to_string(), "a".to_string()]));
    }

    #[::core::prelude::v1::test]
    fn absent_or_empty_text_renders_no_body() {
        assert_eq!(answer(None, None).body(), None);
        assert_eq!(answer(Some(""), None).body(), None);
        assert_eq!(answer(Some("**bold**"), None).body(), Some(AnswerBody::Markdown));
    }

    #[::core::prelude::v1::test]
    fn oversized_text_falls_back_to_plain_text() {
        let large = "x".repeat(MARKDOWN_SAFE_FALLBACK_THRESHOLD_BYTES + 1);
        assert_eq!(answer(Some(&large), None).body(), Some(AnswerBody::PlainText));
    }
}
