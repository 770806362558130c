use std::path::PathBuf;
use std::sync::Arc;

use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use crate::chat::{
    AbortRequested, ChatView, FollowUpSubmitted, SourceClicked, SourceToggled, SourcesPanel,
};
use crate::header::Header;
use crate::search_input::{SearchInput, SearchSubmitted};
use crate::settings::Settings;
use crate::store::{Action, AppStatus, AppStore, SourceClick};

gpui::actions!(lumen, [Quit]);

/// Returns the default themes directory path.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

const CONTENT_MAX_WIDTH: Pixels = px(1080.);
const SOURCES_PANEL_WIDTH: Pixels = px(320.);

/// Which body the root view shows below the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyVariant {
    Suggestions,
    Pending,
    Conversation,
}

impl BodyVariant {
    pub fn select(status: AppStatus, has_summary: bool) -> Self {
        if status.is_idle() {
            Self::Suggestions
        } else if has_summary {
            Self::Conversation
        } else {
            Self::Pending
        }
    }
}

/// Root view: header, search box, then suggestions or the conversation with its sources.
pub struct SearchApp {
    store: Entity<AppStore>,
    settings: Arc<Settings>,
    search_input: Entity<SearchInput>,
    chat_view: Entity<ChatView>,
    sources_panel: Entity<SourcesPanel>,
    search_query: String,
}

impl SearchApp {
    pub fn new(
        store: Entity<AppStore>,
        settings: Arc<Settings>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let search_input = cx.new(|cx| SearchInput::new(window, cx));
        let chat_view = cx.new(|cx| ChatView::new(window, cx));
        let sources_panel = cx.new(SourcesPanel::new);

        cx.observe(&store, |this, _, cx| {
            this.sync_from_store(cx);
        })
        .detach();

        cx.subscribe(&search_input, |this, _, event: &SearchSubmitted, cx| {
            this.handle_search(event.query.clone(), cx);
        })
        .detach();

        cx.subscribe(&chat_view, |this, _, event: &FollowUpSubmitted, cx| {
            this.handle_send_chat_message(event.content.clone(), cx);
        })
        .detach();

        cx.subscribe(&chat_view, |this, _, _event: &AbortRequested, cx| {
            this.handle_abort_request(cx);
        })
        .detach();

        cx.subscribe(&chat_view, |this, _, event: &SourceClicked, cx| {
            this.handle_source_click(event.name.to_string(), cx);
        })
        .detach();

        cx.subscribe(&sources_panel, |this, _, event: &SourceToggled, cx| {
            this.handle_toggle_source(event.name.to_string(), cx);
        })
        .detach();

        Self {
            store,
            settings,
            search_input,
            chat_view,
            sources_panel,
            search_query: String::new(),
        }
    }

    fn dispatch(&self, action: Action, cx: &mut Context<Self>) {
        self.store.update(cx, |store, cx| store.dispatch(action, cx));
    }

    fn handle_search(&mut self, query: String, cx: &mut Context<Self>) {
        self.dispatch(Action::search(query), cx);
    }

    fn handle_send_chat_message(&mut self, query: String, cx: &mut Context<Self>) {
        self.dispatch(Action::ask_question(query), cx);
    }

    fn handle_abort_request(&mut self, cx: &mut Context<Self>) {
        self.dispatch(Action::AbortRequest, cx);
    }

    fn handle_toggle_source(&mut self, name: String, cx: &mut Context<Self>) {
        self.dispatch(Action::source_toggle(name, None), cx);
    }

    fn handle_source_click(&mut self, name: String, cx: &mut Context<Self>) {
        let click = SourceClick::new(name);
        self.dispatch(click.toggle.clone(), cx);

        // Fire and forget: the row may not exist yet, in which case nothing scrolls.
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(click.delay).await;

            let _ = this.update(cx, |this, cx| {
                this.sources_panel.update(cx, |panel, cx| {
                    panel.scroll_to_source(&click.scroll_to, cx);
                });
            });
        })
        .detach();
    }

    fn handle_suggested_query(&mut self, query: String, window: &mut Window, cx: &mut Context<Self>) {
        self.search_query = query.clone();
        let value = self.search_query.clone();
        self.search_input.update(cx, |input, cx| {
            input.set_value(&value, window, cx);
        });
        self.handle_search(query, cx);
    }

    fn sync_from_store(&mut self, cx: &mut Context<Self>) {
        let state = self.store.read(cx).state().clone();

        self.search_input.update(cx, |input, cx| {
            input.set_status(state.status(), cx);
        });
        self.chat_view.update(cx, |view, cx| {
            view.set_conversation(&state, cx);
        });
        self.sources_panel.update(cx, |panel, cx| {
            panel.set_sources(state.sources(), cx);
        });
        cx.notify();
    }

    fn render_suggestions(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .id("suggested-queries")
            .w_full()
            .my_2()
            .gap_4()
            .child(
                h_flex()
                    .gap_2()
                    .mt_2()
                    .items_center()
                    .child(
                        Icon::new(IconName::Inbox)
                            .size(px(16.))
                            .text_color(theme.muted_foreground),
                    )
                    .child(
                        Label::new("Frequently asked")
                            .text_sm()
                            .font_weight(FontWeight::MEDIUM)
                            .text_color(theme.muted_foreground),
                    ),
            )
            .children(
                self.settings
                    .suggested_queries
                    .iter()
                    .enumerate()
                    .map(|(index, query)| {
                        let query = query.clone();
                        Button::new(SharedString::from(format!("suggested-query-{index}")))
                            .outline()
                            .w_full()
                            .child(query.clone())
                            .on_click(cx.listener(move |this, _, window, cx| {
                                this.handle_suggested_query(query.clone(), window, cx);
                            }))
                    }),
            )
            .into_any_element()
    }

    fn render_pending(&self, error: Option<String>, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let (message, color) = match error {
            Some(error) => (format!("Something went wrong: {error}"), theme.danger),
            None => (
                "Looking that up for you...".to_string(),
                theme.muted_foreground,
            ),
        };

        v_flex()
            .id("pending-answer")
            .w_full()
            .h_36()
            .mt_6()
            .p_6()
            .gap_4()
            .items_center()
            .justify_start()
            .rounded_md()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .child(
                Icon::new(IconName::BookOpen)
                    .size(px(64.))
                    .text_color(theme.muted_foreground),
            )
            .child(Label::new(message).text_sm().text_color(color))
            .into_any_element()
    }

    fn render_conversation(&self) -> AnyElement {
        h_flex()
            .id("conversation")
            .w_full()
            .flex_1()
            .min_h_0()
            .gap_4()
            .items_start()
            .child(
                div()
                    .flex_1()
                    .min_w_0()
                    .h_full()
                    .child(self.chat_view.clone()),
            )
            .child(
                div()
                    .w(SOURCES_PANEL_WIDTH)
                    .flex_shrink_0()
                    .h_full()
                    .child(self.sources_panel.clone()),
            )
            .into_any_element()
    }
}

impl Render for SearchApp {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let state = self.store.read(cx).state();
        let variant = BodyVariant::select(state.status(), state.has_summary());
        let error = state.error().map(str::to_string);
        let home_url = self.settings.home_url.clone().map(SharedString::from);

        let body = match variant {
            BodyVariant::Suggestions => self.render_suggestions(cx),
            BodyVariant::Pending => self.render_pending(error, cx),
            BodyVariant::Conversation => self.render_conversation(),
        };

        v_flex()
            .id("search-app")
            .size_full()
            .bg(theme.background)
            .child(Header::new(home_url))
            .child(
                v_flex()
                    .id("search-app-content")
                    .flex_1()
                    .min_h_0()
                    .w_full()
                    .max_w(CONTENT_MAX_WIDTH)
                    .mx_auto()
                    .p_4()
                    .gap_2()
                    .child(self.search_input.clone())
                    .child(body),
            )
    }
}
