//! Conversation session: one linear user/assistant exchange at a time.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ChatBackend, ChatReply, ChatRequest};
use crate::error::{DeskError, DeskResult};
use crate::render::SessionView;
use crate::state::{ActivityRecord, ChatMessage};

pub const VALIDATION_TEXT: &str = "Please enter both User ID and message";
pub const SERVER_ERROR_TEXT: &str =
    "❌ Error: Could not reach the server. Please ensure the backend is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The user turn was recorded and the request is now in flight.
    Started,
    /// Another exchange is still in flight; nothing happened.
    Busy,
}

type InFlight = JoinHandle<DeskResult<ChatReply>>;

pub struct ConversationSession<B> {
    backend: Arc<B>,
    transcript: Vec<ChatMessage>,
    activity_log: Vec<ActivityRecord>,
    // Single slot: at most one outstanding exchange.
    in_flight: Option<InFlight>,
}

impl<B: ChatBackend + 'static> ConversationSession<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            transcript: Vec::new(),
            activity_log: Vec::new(),
            in_flight: None,
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn activity_log(&self) -> &[ActivityRecord] {
        &self.activity_log
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validate, record the user turn and start the request.
    ///
    /// Returns `Busy` without side effects when an exchange is already in
    /// flight. The slot is claimed before this returns, so a second call can
    /// never race past the check.
    pub fn begin_turn(
        &mut self,
        user_id: &str,
        message: &str,
        view: &mut dyn SessionView,
    ) -> DeskResult<SendOutcome> {
        let user_id = user_id.trim();
        let message = message.trim();

        if user_id.is_empty() || message.is_empty() {
            view.alert(VALIDATION_TEXT);
            return Err(DeskError::Validation(VALIDATION_TEXT.to_string()));
        }

        if self.in_flight.is_some() {
            debug!("send ignored, an exchange is already in flight");
            return Ok(SendOutcome::Busy);
        }

        let turn = ChatMessage::user(message);
        self.transcript.push(turn.clone());
        view.append_turn(&turn);
        view.clear_input();
        view.set_processing(true);

        let request = ChatRequest {
            user_id: user_id.to_string(),
            message: message.to_string(),
        };
        info!(user_id = %request.user_id, "sending chat message");

        let backend = Arc::clone(&self.backend);
        self.in_flight = Some(tokio::spawn(async move { backend.chat(&request).await }));

        Ok(SendOutcome::Started)
    }

    /// True once the in-flight request has resolved and can be settled
    /// without waiting.
    pub fn is_ready(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|task| task.is_finished())
    }

    /// Wait for the in-flight exchange and render its outcome.
    ///
    /// Returns false when nothing was in flight. Cancel-safe: the slot is only
    /// emptied after the request has resolved.
    pub async fn settle(&mut self, view: &mut dyn SessionView) -> bool {
        let joined = match self.in_flight.as_mut() {
            Some(task) => task.await,
            None => return false,
        };
        self.in_flight = None;

        let outcome = joined.unwrap_or_else(|e| Err(DeskError::TaskFailed(e.to_string())));
        self.apply_outcome(outcome, view);
        view.set_processing(false);
        true
    }

    /// Settle only if the request has already finished.
    pub async fn settle_if_ready(&mut self, view: &mut dyn SessionView) -> bool {
        if self.is_ready() {
            self.settle(view).await
        } else {
            false
        }
    }

    /// Full exchange: `begin_turn` followed by `settle`.
    pub async fn send_turn(
        &mut self,
        user_id: &str,
        message: &str,
        view: &mut dyn SessionView,
    ) -> DeskResult<SendOutcome> {
        let outcome = self.begin_turn(user_id, message, view)?;
        if outcome == SendOutcome::Started {
            self.settle(view).await;
        }
        Ok(outcome)
    }

    /// Empty the activity log. The transcript and the in-flight slot are
    /// left alone.
    pub fn clear_activity_log(&mut self, view: &mut dyn SessionView) {
        self.activity_log.clear();
        view.clear_log();
    }

    fn apply_outcome(&mut self, outcome: DeskResult<ChatReply>, view: &mut dyn SessionView) {
        match outcome {
            Ok(reply) => {
                info!(activities = reply.activities().len(), "received reply");
                self.push_turn(ChatMessage::assistant(reply.reply.as_str()), view);
                for record in reply.activities() {
                    self.push_record(record.clone(), view);
                }
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                self.push_turn(ChatMessage::assistant(SERVER_ERROR_TEXT), view);
                self.push_record(
                    ActivityRecord::new("error", json!({ "error": e.to_string() })),
                    view,
                );
            }
        }
    }

    fn push_turn(&mut self, turn: ChatMessage, view: &mut dyn SessionView) {
        view.append_turn(&turn);
        self.transcript.push(turn);
    }

    fn push_record(&mut self, record: ActivityRecord, view: &mut dyn SessionView) {
        view.append_log_entry(&record);
        self.activity_log.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HealthReport;
    use crate::render::PaneView;
    use crate::state::ChatRole;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    enum Script {
        Reply(&'static str),
        Fail(StatusCode),
        Panic,
    }

    struct FakeBackend {
        script: Script,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
        last_request: Mutex<Option<ChatRequest>>,
    }

    impl FakeBackend {
        fn new(script: Script) -> Self {
            Self {
                script,
                gate: None,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn gated(script: Script, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(script)
            }
        }
    }

    #[async_trait]
    impl ChatBackend for FakeBackend {
        async fn health(&self) -> DeskResult<HealthReport> {
            unreachable!("session never checks health")
        }

        async fn chat(&self, request: &ChatRequest) -> DeskResult<ChatReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.script {
                Script::Reply(body) => Ok(serde_json::from_str(body)?),
                Script::Fail(status) => Err(DeskError::Http { status: *status }),
                Script::Panic => panic!("backend task crashed"),
            }
        }
    }

    const LOOKUP_REPLY: &str =
        r#"{"reply":"hi","activity_log":[{"step":"lookup_user","result":{"found":true}}]}"#;

    #[tokio::test]
    async fn test_successful_exchange() {
        let backend = Arc::new(FakeBackend::new(Script::Reply(LOOKUP_REPLY)));
        let mut session = ConversationSession::new(backend.clone());
        let mut view = PaneView::default();

        let outcome = session.send_turn("jv-123", "who am I?", &mut view).await.unwrap();

        assert_eq!(outcome, SendOutcome::Started);
        assert_eq!(
            session.transcript(),
            &[ChatMessage::user("who am I?"), ChatMessage::assistant("hi")]
        );
        assert_eq!(session.activity_log().len(), 1);

        let block = &view.activity.blocks()[0];
        assert_eq!(block.label, "lookup user");
        assert_eq!(block.details, "{\n  \"found\": true\n}");
        assert_eq!(view.transcript.blocks().len(), 2);
        assert!(view.input_cleared);
        assert!(!view.processing);
        assert!(!session.is_processing());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_inputs_are_trimmed() {
        let backend = Arc::new(FakeBackend::new(Script::Reply(r#"{"reply":"ok"}"#)));
        let mut session = ConversationSession::new(backend.clone());
        let mut view = PaneView::default();

        session.send_turn("  jv-123 ", "\treset my password  ", &mut view).await.unwrap();

        assert_eq!(session.transcript()[0].content, "reset my password");
        let request = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.user_id, "jv-123");
        assert_eq!(request.message, "reset my password");
        assert!(session.activity_log().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_without_network() {
        let backend = Arc::new(FakeBackend::new(Script::Reply(LOOKUP_REPLY)));
        let mut session = ConversationSession::new(backend.clone());
        let mut view = PaneView::default();

        let err = session.send_turn("jv-123", "   ", &mut view).await.unwrap_err();
        assert!(err.is_validation());
        let err = session.send_turn("", "hello", &mut view).await.unwrap_err();
        assert!(err.is_validation());

        assert!(session.transcript().is_empty());
        assert!(session.activity_log().is_empty());
        assert_eq!(view.alert.as_deref(), Some(VALIDATION_TEXT));
        assert!(view.transcript.shows_welcome());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_send_while_in_flight_is_noop() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend::gated(Script::Reply(LOOKUP_REPLY), gate.clone()));
        let mut session = ConversationSession::new(backend.clone());
        let mut view = PaneView::default();

        let first = session.begin_turn("u1", "first", &mut view).unwrap();
        assert_eq!(first, SendOutcome::Started);
        assert!(session.is_processing());
        assert!(view.processing);

        let second = session.begin_turn("u1", "second", &mut view).unwrap();
        assert_eq!(second, SendOutcome::Busy);
        assert_eq!(session.transcript().len(), 1);

        gate.notify_one();
        assert!(session.settle(&mut view).await);

        assert_eq!(session.transcript().len(), 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(!session.is_processing());
        assert!(!session.settle(&mut view).await);
    }

    #[tokio::test]
    async fn test_http_failure_appends_apology_and_one_error_entry() {
        let backend = Arc::new(FakeBackend::new(Script::Fail(StatusCode::BAD_GATEWAY)));
        let mut session = ConversationSession::new(backend);
        let mut view = PaneView::default();

        session.send_turn("u1", "hello", &mut view).await.unwrap();

        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript()[1].role, ChatRole::Assistant);
        assert_eq!(session.transcript()[1].content, SERVER_ERROR_TEXT);
        assert_eq!(session.activity_log().len(), 1);

        let record = &session.activity_log()[0];
        assert!(record.is_error());
        assert_eq!(
            record.result,
            json!({"error": "HTTP error! status: 502 Bad Gateway"})
        );
        assert!(view.activity.blocks()[0].is_error);
        assert!(!session.is_processing());
        assert!(!view.processing);
    }

    #[tokio::test]
    async fn test_crashed_request_task_still_releases_slot() {
        let backend = Arc::new(FakeBackend::new(Script::Panic));
        let mut session = ConversationSession::new(backend);
        let mut view = PaneView::default();

        session.send_turn("u1", "hello", &mut view).await.unwrap();

        assert!(!session.is_processing());
        assert_eq!(session.transcript()[1].content, SERVER_ERROR_TEXT);
        assert_eq!(session.activity_log()[0].step, "error");

        let again = session.send_turn("u1", "retry", &mut view).await.unwrap();
        assert_eq!(again, SendOutcome::Started);
    }

    #[tokio::test]
    async fn test_clear_log_leaves_transcript_and_slot() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend::gated(Script::Reply(LOOKUP_REPLY), gate.clone()));
        let mut session = ConversationSession::new(backend);
        let mut view = PaneView::default();

        // A stored permit lets the first exchange through immediately.
        gate.notify_one();
        session.send_turn("u1", "before", &mut view).await.unwrap();
        assert_eq!(session.activity_log().len(), 1);

        session.begin_turn("u1", "pending", &mut view).unwrap();
        session.clear_activity_log(&mut view);

        assert!(session.activity_log().is_empty());
        assert!(view.activity.shows_placeholder());
        assert!(session.is_processing());
        assert_eq!(session.transcript().len(), 3);

        gate.notify_one();
        session.settle(&mut view).await;
        assert_eq!(session.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_settle_if_ready_does_not_block() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend::gated(Script::Reply(LOOKUP_REPLY), gate.clone()));
        let mut session = ConversationSession::new(backend);
        let mut view = PaneView::default();

        session.begin_turn("u1", "hello", &mut view).unwrap();
        assert!(!session.settle_if_ready(&mut view).await);
        assert!(session.is_processing());

        gate.notify_one();
        while !session.is_ready() {
            tokio::task::yield_now().await;
        }
        assert!(session.settle_if_ready(&mut view).await);
        assert!(!session.is_processing());
    }
}
