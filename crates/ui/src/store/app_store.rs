use std::sync::Arc;

use gpui::*;
use gpui_tokio_bridge::Tokio;
use snafu::{OptionExt, ensure};

use crate::store::action::Action;
use crate::store::backend::{
    BackendEventMapped, BackendEventStream, BackendResult, BackendStreamHandle,
    EmptyQuerySnafu, NotConfiguredSnafu, QueryBackend, QueryKind, QueryRequest, RequestId,
};
use crate::store::state::AppState;

/// Shared state container the views observe and dispatch into.
pub struct AppStore {
    state: AppState,
    backend: Option<Arc<dyn QueryBackend>>,
    next_request_id: u64,
    active_request: Option<RequestId>,
    worker_task: Option<Task<Result<(), gpui_tokio_bridge::JoinError>>>,
    reader_task: Option<Task<()>>,
}

impl AppStore {
    pub fn new(backend: Option<Arc<dyn QueryBackend>>) -> Self {
        if let Some(backend) = backend.as_ref() {
            tracing::info!(backend_id = %backend.id(), "store bound to backend");
        } else {
            tracing::warn!("store created without a backend; queries will fail");
        }

        Self {
            state: AppState::new(),
            backend,
            next_request_id: 1,
            active_request: None,
            worker_task: None,
            reader_task: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action, cx: &mut Context<Self>) {
        tracing::debug!(?action, status = ?self.state.status(), "dispatch");

        match action {
            Action::Search(query) => self.search(query, cx),
            Action::AskQuestion(query) => self.ask_question(query, cx),
            Action::AbortRequest => self.abort_request(cx),
            Action::SourceToggle { name, expanded } => {
                if !self.state.toggle_source(&name, expanded) {
                    tracing::debug!(source = %name, "toggle for unknown source ignored");
                }
                cx.notify();
            }
        }
    }

    fn search(&mut self, query: String, cx: &mut Context<Self>) {
        if query.trim().is_empty() {
            return;
        }

        self.cancel_active_request();
        self.state.begin_search();
        self.start_request(QueryKind::Search, query, cx);
        cx.notify();
    }

    fn ask_question(&mut self, query: String, cx: &mut Context<Self>) {
        if !self.state.begin_follow_up(&query) {
            return;
        }

        self.start_request(QueryKind::FollowUp, query, cx);
        cx.notify();
    }

    fn abort_request(&mut self, cx: &mut Context<Self>) {
        if let Some(request_id) = self.active_request {
            tracing::info!(?request_id, "aborting in-flight request");
        }

        self.cancel_active_request();
        self.state.abort();
        cx.notify();
    }

    fn start_request(&mut self, kind: QueryKind, query: String, cx: &mut Context<Self>) {
        let Some((request_id, handle)) = self.prepare_request(kind, query) else {
            return;
        };

        self.active_request = Some(request_id);
        self.worker_task = Some(Tokio::spawn(cx, handle.worker));
        self.spawn_reader(handle.stream, cx);
    }

    /// Opens the backend stream for a new request, recording a failure on the state.
    fn prepare_request(
        &mut self,
        kind: QueryKind,
        query: String,
    ) -> Option<(RequestId, BackendStreamHandle)> {
        let request_id = self.alloc_request_id();
        let request = QueryRequest::new(request_id, kind, query)
            .with_session_id(self.state.session_id().map(str::to_string));

        match self.open_request(request) {
            Ok(handle) => Some((request_id, handle)),
            Err(error) => {
                tracing::error!(?request_id, ?kind, error = %error, "failed to open backend stream");
                self.state.fail(error.to_string());
                None
            }
        }
    }

    fn open_request(&self, request: QueryRequest) -> BackendResult<BackendStreamHandle> {
        ensure!(
            !request.query.trim().is_empty(),
            EmptyQuerySnafu {
                stage: "open-request",
                request_id: request.id,
            }
        );

        let backend = self.backend.as_ref().context(NotConfiguredSnafu {
            stage: "open-request",
        })?;
        backend.open_stream(request)
    }

    fn spawn_reader(&mut self, mut stream: BackendEventStream, cx: &mut Context<Self>) {
        let request_id = stream.request_id();

        self.reader_task = Some(cx.spawn(async move |this, cx| {
            while let Some(mapped) = stream.recv().await {
                let _ = this.update(cx, |this, cx| {
                    this.handle_backend_event(mapped, cx);
                });
            }

            let _ = this.update(cx, |this, cx| {
                this.handle_stream_closed(request_id, cx);
            });
        }));
    }

    fn handle_backend_event(&mut self, mapped: BackendEventMapped, cx: &mut Context<Self>) {
        if self.settle_event(mapped) {
            cx.notify();
        }
    }

    fn handle_stream_closed(&mut self, request_id: RequestId, cx: &mut Context<Self>) {
        if self.settle_closed(request_id) {
            cx.notify();
        }
    }

    /// Applies an event of the active request. Returns false for stale events.
    fn settle_event(&mut self, mapped: BackendEventMapped) -> bool {
        if !accepts_event(self.active_request, mapped.request_id) {
            tracing::debug!(request_id = ?mapped.request_id, "dropping stale backend event");
            return false;
        }

        let terminal = mapped.event.is_terminal();
        self.state.apply_event(mapped.event);

        if terminal {
            self.active_request = None;
            self.worker_task = None;
        }
        true
    }

    /// A stream that ends while its request is still active never sent `Done` or `Error`.
    fn settle_closed(&mut self, request_id: RequestId) -> bool {
        if !accepts_event(self.active_request, request_id) {
            return false;
        }

        self.active_request = None;
        self.worker_task = None;
        tracing::warn!(?request_id, "backend stream ended before a terminal event");
        self.state
            .fail("backend stream ended before the answer completed");
        true
    }

    fn cancel_active_request(&mut self) {
        // Dropping the reader drops the event stream, which signals the worker to stop.
        self.worker_task = None;
        self.reader_task = None;
        self.active_request = None;
    }

    fn alloc_request_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id = self.next_request_id.saturating_add(1);
        id
    }
}

fn accepts_event(active: Option<RequestId>, incoming: RequestId) -> bool {
    active == Some(incoming)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::store::backend::{BackendError, BackendEvent, make_event_stream};
    use crate::store::state::AppStatus;

    #[derive(Default)]
    struct RecordingBackend {
        requests: Mutex<Vec<QueryRequest>>,
    }

    impl RecordingBackend {
        fn requests(&self) -> Vec<QueryRequest> {
            self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
        }
    }

    impl QueryBackend for RecordingBackend {
        fn id(&self) -> &str {
            "recording"
        }

        fn open_stream(&self, request: QueryRequest) -> BackendResult<BackendStreamHandle> {
            let (event_tx, stream, _cancel_rx) = make_event_stream(request.id);
            let request_id = request.id;
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }

            let worker = Box::pin(async move {
                let _ = event_tx.send(BackendEventMapped {
                    request_id,
                    event: BackendEvent::Done,
                });
            });
            Ok(BackendStreamHandle { stream, worker })
        }
    }

    fn mapped(request_id: u64, event: BackendEvent) -> BackendEventMapped {
        BackendEventMapped {
            request_id: RequestId::new(request_id),
            event,
        }
    }

    fn searching_store(request_id: u64) -> AppStore {
        let mut store = AppStore::new(None);
        store.state.begin_search();
        store.active_request = Some(RequestId::new(request_id));
        store
    }

    #[::core::prelude::v1::test]
    fn only_the_active_request_is_accepted() {
        assert!(accepts_event(Some(RequestId::new(4)), RequestId::new(4)));
        assert!(!accepts_event(Some(RequestId::new(5)), RequestId::new(4)));
        assert!(!accepts_event(None, RequestId::new(4)));
    }

    #[::core::prelude::v1::test]
    fn missing_backend_surfaces_not_configured_error() {
        let mut store = AppStore::new(None);
        store.state.begin_search();

        assert!(store.prepare_request(QueryKind::Search, "laws".to_string()).is_none());
        assert_eq!(store.state.status(), AppStatus::Error);
        assert_eq!(store.state.error(), Some("no search backend is configured"));
        assert_eq!(store.active_request, None);
    }

    #[::core::prelude::v1::test]
    fn open_request_rejects_blank_query_before_backend_lookup() {
        let store = AppStore::new(None);

        let blank = QueryRequest::new(RequestId::new(1), QueryKind::Search, "  ");
        assert!(matches!(
            store.open_request(blank),
            Err(BackendError::EmptyQuery { .. })
        ));

        let query = QueryRequest::new(RequestId::new(2), QueryKind::Search, "laws");
        assert!(matches!(
            store.open_request(query),
            Err(BackendError::NotConfigured { .. })
        ));
    }

    #[::core::prelude::v1::test]
    fn follow_up_request_carries_session_id() {
        let backend = Arc::new(RecordingBackend::default());
        let mut store = AppStore::new(Some(backend.clone()));

        store.state.begin_search();
        let (first_id, _first) = store
            .prepare_request(QueryKind::Search, "laws".to_string())
            .expect("search stream");
        store.active_request = Some(first_id);
        assert!(store.settle_event(BackendEventMapped {
            request_id: first_id,
            event: BackendEvent::Session("session-7".to_string()),
        }));

        let (second_id, _second) = store
            .prepare_request(QueryKind::FollowUp, "who signed?".to_string())
            .expect("follow-up stream");
        assert_ne!(first_id, second_id);

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].session_id, None);
        assert_eq!(requests[1].kind, QueryKind::FollowUp);
        assert_eq!(requests[1].session_id.as_deref(), Some("session-7"));
    }

    #[::core::prelude::v1::test]
    fn stale_events_leave_state_untouched() {
        let mut store = searching_store(2);

        assert!(!store.settle_event(mapped(1, BackendEvent::Delta("old".to_string()))));
        assert_eq!(store.state.status(), AppStatus::Loading);
        assert!(!store.state.has_summary());
        assert_eq!(store.active_request, Some(RequestId::new(2)));
    }

    #[::core::prelude::v1::test]
    fn terminal_events_release_the_active_request() {
        let mut store = searching_store(3);

        assert!(store.settle_event(mapped(3, BackendEvent::Delta("answer".to_string()))));
        assert_eq!(store.state.status(), AppStatus::Answering);
        assert_eq!(store.active_request, Some(RequestId::new(3)));

        assert!(store.settle_event(mapped(3, BackendEvent::Done)));
        assert_eq!(store.state.status(), AppStatus::Done);
        assert_eq!(store.active_request, None);

        let mut failing = searching_store(4);
        assert!(failing.settle_event(mapped(4, BackendEvent::Error("index down".to_string()))));
        assert_eq!(failing.active_request, None);
        assert_eq!(failing.state.error(), Some("index down"));
    }

    #[::core::prelude::v1::test]
    fn stream_closing_early_fails_the_request() {
        let mut store = searching_store(5);

        assert!(!store.settle_closed(RequestId::new(4)));
        assert_eq!(store.state.status(), AppStatus::Loading);

        assert!(store.settle_closed(RequestId::new(5)));
        assert_eq!(store.state.status(), AppStatus::Error);
        assert_eq!(
            store.state.error(),
            Some("backend stream ended before the answer completed")
        );
        assert_eq!(store.active_request, None);
    }

    #[::core::prelude::v1::test]
    fn stream_closing_after_done_is_ignored() {
        let mut store = searching_store(6);
        assert!(store.settle_event(mapped(6, BackendEvent::Done)));

        assert!(!store.settle_closed(RequestId::new(6)));
        assert_eq!(store.state.status(), AppStatus::Done);
    }
}
