use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, Icon, IconName, h_flex, label::Label};

/// Static branding bar with a home link.
#[derive(IntoElement)]
pub struct Header {
    home_url: Option<SharedString>,
}

impl Header {
    pub fn new(home_url: Option<SharedString>) -> Self {
        Self { home_url }
    }
}

impl RenderOnce for Header {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("app-header")
            .w_full()
            .flex_shrink_0()
            .px_8()
            .py_3()
            .items_center()
            .bg(theme.foreground)
            .child(
                h_flex()
                    .id("app-header-home")
                    .gap_2()
                    .items_center()
                    .pl_8()
                    .border_l_1()
                    .border_color(theme.muted_foreground)
                    .child(
                        Icon::new(IconName::BookOpen)
                            .size(px(24.))
                            .text_color(theme.background),
                    )
                    .child(
                        Label::new("Lumen")
                            .text_lg()
                            .font_weight(FontWeight::BOLD)
                            .text_color(theme.background),
                    )
                    .when_some(self.home_url, |link, url| {
                        link.cursor_pointer().on_click(move |_, _, cx| {
                            cx.open_url(&url);
                        })
                    }),
            )
    }
}
