pub mod action;
pub mod app_store;
/// Contract of the network collaborator that answers queries.
pub mod backend;
/// Session state and the reducers applied to it.
pub mod state;

pub use action::{Action, SOURCE_SCROLL_DELAY, SourceClick};
pub use app_store::AppStore;
pub use backend::{
    BackendError, BackendEvent, BackendEventMapped, BackendEventStream, BackendResult,
    BackendStreamHandle, BackendWorker, QueryBackend, QueryKind, QueryRequest, RequestId,
    make_event_stream,
};
pub use state::{AppState, AppStatus, ChatMessage, MessageId, Role, Source};
