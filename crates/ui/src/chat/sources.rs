use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use crate::chat::events::SourceToggled;
use crate::store::Source;

const PAGE_CONTENT_PREVIEW_CHARS: usize = 1_200;

/// Side panel listing every source cited in the current session.
pub struct SourcesPanel {
    sources: Vec<Source>,
    scroll_handle: ScrollHandle,
}

impl EventEmitter<SourceToggled> for SourcesPanel {}

impl SourcesPanel {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            sources: Vec::new(),
            scroll_handle: ScrollHandle::new(),
        }
    }

    pub fn set_sources(&mut self, sources: &[Source], cx: &mut Context<Self>) {
        if self.sources == sources {
            return;
        }

        self.sources = sources.to_vec();
        cx.notify();
    }

    /// Scrolls the row for `name` into view. Returns false when no row carries that name yet.
    pub fn scroll_to_source(&mut self, name: &str, cx: &mut Context<Self>) -> bool {
        let Some(index) = source_position(&self.sources, name) else {
            tracing::debug!(source = %name, "scroll target not rendered; skipping");
            return false;
        };

        self.scroll_handle.scroll_to_item(index);
        cx.notify();
        true
    }

    fn render_row(&self, index: usize, source: &Source, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let name = SharedString::from(source.name.clone());
        let toggle_icon = if source.expanded {
            IconName::ChevronDown
        } else {
            IconName::ChevronRight
        };
        let details = source.expanded.then(|| source.clone());

        v_flex()
            .id(SharedString::from(format!("source-row-{index}")))
            .w_full()
            .gap_2()
            .p_3()
            .rounded_md()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .child(
                h_flex()
                    .w_full()
                    .gap_2()
                    .items_center()
                    .child(
                        Button::new(SharedString::from(format!("source-toggle-{index}")))
                            .ghost()
                            .small()
                            .icon(toggle_icon)
                            .on_click(cx.listener(move |_, _, _window, cx| {
                                cx.emit(SourceToggled { name: name.clone() });
                            })),
                    )
                    .child(
                        Label::new(source.name.clone())
                            .text_sm()
                            .font_weight(FontWeight::MEDIUM),
                    ),
            )
            .when_some(details, |row, source| {
                row.when_some(source.summary, |row, summary| {
                    row.child(
                        Label::new(summary)
                            .text_xs()
                            .text_color(theme.muted_foreground),
                    )
                })
                .when_some(source.page_content, |row, content| {
                    row.child(Label::new(preview(&content)).text_sm())
                })
                .when_some(source.url, |row, url| {
                    row.child(
                        Button::new(SharedString::from(format!("source-link-{index}")))
                            .link()
                            .small()
                            .icon(IconName::ExternalLink)
                            .child(url.clone())
                            .on_click(move |_, _, cx| {
                                cx.open_url(&url);
                            }),
                    )
                })
            })
    }
}

impl Render for SourcesPanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let rows = self
            .sources
            .iter()
            .enumerate()
            .map(|(index, source)| self.render_row(index, source, cx).into_any_element())
            .collect::<Vec<_>>();

        v_flex()
            .id("sources-panel")
            .w_full()
            .min_h_0()
            .gap_2()
            .child(
                Label::new(format!("Sources ({})", self.sources.len()))
                    .text_sm()
                    .text_color(theme.muted_foreground),
            )
            .child(
                v_flex()
                    .id("sources-list")
                    .flex_1()
                    .min_h_0()
                    .gap_2()
                    .overflow_y_scroll()
                    .track_scroll(&self.scroll_handle)
                    .children(rows),
            )
    }
}

fn source_position(sources: &[Source], name: &str) -> Option<usize> {
    sources.iter().position(|source| source.name == name)
}

fn preview(content: &str) -> String {
    if content.chars().count() <= PAGE_CONTENT_PREVIEW_CHARS {
        return content.to_string();
    }

    let mut truncated = content
        .chars()
        .take(PAGE_CONTENT_PREVIEW_CHARS)
        .collect::<String>();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn source_position_matches_exact_name() {
        let sources = vec![Source::new("alpha"), Source::new("beta")];

        assert_eq!(source_position(&sources, "beta"), Some(1));
        assert_eq!(source_position(&sources, "Beta"), None);
        assert_eq!(source_position(&[], "alpha"), None);
    }

    #[::core::prelude::v1::test]
    fn preview_truncates_long_content_on_char_boundary() {
        let content = "א".repeat(PAGE_CONTENT_PREVIEW_CHARS + 10);
        let shortened = preview(&content);

        assert_eq!(shortened.chars().count(), PAGE_CONTENT_PREVIEW_CHARS + 1);
        assert!(shortened.ends_with('…'));
        assert_eq!(preview("short"), "short");
    }
}
