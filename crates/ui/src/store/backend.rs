use futures::future::BoxFuture;
use snafu::Snafu;
use tokio::sync::{mpsc, oneshot};

use crate::store::state::Source;

/// Identifier of one backend request; changes on every dispatch so stale events can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl RequestId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// A new search that produces the conversation summary.
    Search,
    /// A question asked within the current session.
    FollowUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub id: RequestId,
    pub kind: QueryKind,
    pub query: String,
    pub session_id: Option<String>,
}

impl QueryRequest {
    pub fn new(id: RequestId, kind: QueryKind, query: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            query: query.into(),
            session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }
}

/// One streamed backend event, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Session(String),
    Source(Source),
    Delta(String),
    Done,
    Error(String),
}

impl BackendEvent {
    /// `Done` and `Error` end a request; nothing follows them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEventMapped {
    pub request_id: RequestId,
    pub event: BackendEvent,
}

pub type BackendWorker = BoxFuture<'static, ()>;
pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BackendError {
    #[snafu(display("no search backend is configured"))]
    NotConfigured { stage: &'static str },
    #[snafu(display("query for {request_id:?} is empty"))]
    EmptyQuery {
        stage: &'static str,
        request_id: RequestId,
    },
}

/// Receiving half of a backend stream. Dropping it cancels the worker.
pub struct BackendEventStream {
    request_id: RequestId,
    events: mpsc::UnboundedReceiver<BackendEventMapped>,
    cancel_tx: Option<oneshot::Sender<()>>,
}

pub struct BackendStreamHandle {
    pub stream: BackendEventStream,
    pub worker: BackendWorker,
}

impl BackendEventStream {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub async fn recv(&mut self) -> Option<BackendEventMapped> {
        self.events.recv().await
    }
}

impl Drop for BackendEventStream {
    fn drop(&mut self) {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(());
        }
    }
}

/// Network collaborator that answers queries for the store.
pub trait QueryBackend: Send + Sync {
    fn id(&self) -> &str;
    fn open_stream(&self, request: QueryRequest) -> BackendResult<BackendStreamHandle>;
}

/// Builds the channel pair a backend implementation feeds from its worker.
pub fn make_event_stream(
    request_id: RequestId,
) -> (
    mpsc::UnboundedSender<BackendEventMapped>,
    BackendEventStream,
    oneshot::Receiver<()>,
) {
    let (event_tx, events) = mpsc::unbounded_channel();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    (
        event_tx,
        BackendEventStream {
            request_id,
            events,
            cancel_tx: Some(cancel_tx),
        },
        cancel_rx,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropping_stream_signals_cancellation() {
        let (event_tx, stream, cancel_rx) = make_event_stream(RequestId::new(3));
        assert_eq!(stream.request_id(), RequestId::new(3));

        drop(stream);

        assert!(cancel_rx.await.is_ok());
        assert!(event_tx.is_closed());
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (event_tx, mut stream, _cancel_rx) = make_event_stream(RequestId::new(1));
        for event in [BackendEvent::Delta("a".to_string()), BackendEvent::Done] {
            event_tx
                .send(BackendEventMapped {
                    request_id: RequestId::new(1),
                    event,
                })
                .expect("receiver alive");
        }
        drop(event_tx);

        let first = stream.recv().await.map(|mapped| mapped.event);
        let second = stream.recv().await.map(|mapped| mapped.event);
        assert_eq!(first, Some(BackendEvent::Delta("a".to_string())));
        assert_eq!(second, Some(BackendEvent::Done));
        assert_eq!(stream.recv().await, None);
    }

    #[test]
    fn only_done_and_error_are_terminal() {
        assert!(BackendEvent::Done.is_terminal());
        assert!(BackendEvent::Error("x".to_string()).is_terminal());
        assert!(!BackendEvent::Delta("x".to_string()).is_terminal());
        assert!(!BackendEvent::Session("s".to_string()).is_terminal());
    }
}
