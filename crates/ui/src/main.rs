use gpui::*;
use gpui_component::{Root, ThemeRegistry};

use lumen::app::{Quit, SearchApp, default_themes_path};
use lumen::settings::SettingsStore;
use lumen::store::AppStore;

/// Application entry point.
///
/// Loads settings, wires the theme watcher and opens the search window.
/// No query backend ships with the client, so searches surface a
/// "not configured" error until one is provided.
fn main() {
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);
        gpui_component::init(cx);

        let settings_store = SettingsStore::load();
        tracing::info!(
            path = %settings_store.config_path().display(),
            "settings loaded"
        );

        // Missing themes directory is non-fatal; built-in themes are used instead.
        let watched_settings = settings_store.clone();
        if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, move |cx| {
            watched_settings.reload().apply_theme(None, cx);
            tracing::info!("theme directory reloaded");
        }) {
            tracing::warn!(
                "Failed to watch themes directory: {}. Using default themes.",
                err
            );
            settings_store.settings().apply_theme(None, cx);
        }

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });
        cx.bind_keys([KeyBinding::new("cmd-q", Quit, None)]);

        let settings = settings_store.settings();
        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1200.), px(800.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Lumen".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                cx.open_window(options, |window, cx| {
                    let store = cx.new(|_| AppStore::new(None));
                    let app = cx.new(|cx| SearchApp::new(store, settings, window, cx));

                    cx.new(|cx| Root::new(app, window, cx))
                })
                .expect("failed to open main window");

                cx.activate(true);
            })
        })
        .detach();
    });
}
