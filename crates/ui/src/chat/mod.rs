pub mod answer_message;
/// Events emitted by the chat components.
pub mod events;
pub mod message_input;
pub mod scroll_manager;
/// Collapsible list of the sources backing the current answer.
pub mod sources;
pub mod view;

pub use answer_message::{AnswerBody, AnswerMessage};
pub use events::{AbortRequested, FollowUpSubmitted, SourceClicked, SourceToggled};
pub use message_input::MessageInput;
pub use scroll_manager::ScrollManager;
pub use sources::SourcesPanel;
pub use view::ChatView;
