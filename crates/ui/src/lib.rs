#![deny(unsafe_code)]

/// Answer-engine desktop client built with GPUI and gpui-component.
///
/// The root view lives in [`app`]; session state and its reducers live in [`store`].
pub mod app;
/// Answer transcript, follow-up input and sources panel.
pub mod chat;
pub mod header;
pub mod search_input;
/// Settings persistence.
pub mod settings;
/// Application state container and the backend contract it drives.
pub mod store;
