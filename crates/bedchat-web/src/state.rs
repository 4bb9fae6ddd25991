//! Application state wiring the shared client to per-session adapters.
//!
//! AppState holds what every session shares (the inference client, the
//! generation config and the error formatter) plus the registry of open
//! sessions. Opening a session is the composition root for one conversation:
//! it builds the adapter and injects those shared pieces.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use bedchat_core::chat::adapter::{TurnAdapter, TurnOutcome};
use bedchat_core::chat::format::{ErrorTurnFormatter, VerbatimErrorFormatter};
use bedchat_core::llm::box_client::BoxInferenceClient;
use bedchat_infra::llm::create_client;
use bedchat_types::chat::Turn;
use bedchat_types::config::AppConfig;
use bedchat_types::error::SessionError;
use bedchat_types::llm::GenerationConfig;

/// Adapter type pinned to the type-erased client.
pub type SessionAdapter = TurnAdapter<BoxInferenceClient>;

/// One open chat session.
///
/// The adapter sits behind an async mutex so submissions for the same
/// session run one after another. Readers use the `watch` channel instead,
/// which always holds the latest published turns and never waits on an
/// in-flight model call.
pub struct ChatSession {
    adapter: Mutex<SessionAdapter>,
    view: watch::Sender<Vec<Turn>>,
    opened_at: Instant,
    /// Milliseconds after `opened_at` of the last lookup or submission.
    last_active_ms: AtomicU64,
}

impl ChatSession {
    fn new(adapter: SessionAdapter) -> Self {
        let (view, _) = watch::channel(Vec::new());
        Self {
            adapter: Mutex::new(adapter),
            view,
            opened_at: Instant::now(),
            last_active_ms: AtomicU64::new(0),
        }
    }

    fn touch(&self) {
        let elapsed = self.opened_at.elapsed().as_millis() as u64;
        self.last_active_ms.store(elapsed, Ordering::Relaxed);
    }

    /// Time since the session was last looked up or finished a submission.
    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_active_ms.load(Ordering::Relaxed));
        self.opened_at.elapsed().saturating_sub(last)
    }

    /// Whether a submission currently holds the adapter.
    pub fn is_busy(&self) -> bool {
        self.adapter.try_lock().is_err()
    }

    /// Latest published turns.
    pub fn turns(&self) -> Vec<Turn> {
        self.view.borrow().clone()
    }

    /// Run one user message through the adapter.
    ///
    /// Every adapter update is published to the session view and then handed
    /// to `notify`. Waits for any submission already running on this session.
    pub async fn submit<F>(&self, text: String, mut notify: F) -> TurnOutcome
    where
        F: FnMut(Vec<Turn>),
    {
        let mut adapter = self.adapter.lock().await;
        let outcome = adapter
            .submit_user_message(text, |conversation| {
                let turns = conversation.snapshot();
                self.view.send_replace(turns.clone());
                notify(turns);
            })
            .await;
        self.touch();
        outcome
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    client: Arc<BoxInferenceClient>,
    generation: Arc<GenerationConfig>,
    formatter: Arc<dyn ErrorTurnFormatter>,
    sessions: Arc<DashMap<Uuid, Arc<ChatSession>>>,
}

impl AppState {
    /// Build state around an existing client.
    pub fn new(client: BoxInferenceClient, generation: GenerationConfig) -> Self {
        Self {
            client: Arc::new(client),
            generation: Arc::new(generation),
            formatter: Arc::new(VerbatimErrorFormatter),
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Build state from configuration, creating the Bedrock client.
    pub fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let client = create_client(config)?;
        Ok(Self::new(client, config.generation.clone()))
    }

    /// Replace the formatter used for error turns in sessions opened later.
    pub fn with_formatter(mut self, formatter: Arc<dyn ErrorTurnFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn client(&self) -> &Arc<BoxInferenceClient> {
        &self.client
    }

    pub fn generation(&self) -> &Arc<GenerationConfig> {
        &self.generation
    }

    /// Build an adapter for a new conversation, logging under a span
    /// carrying `session_id`.
    pub fn new_adapter(&self, session_id: Uuid) -> SessionAdapter {
        let span = tracing::info_span!(
            "chat_session",
            session_id = %session_id,
            gen_ai.request.model = %self.generation.model_id
        );
        TurnAdapter::new(Arc::clone(&self.client), Arc::clone(&self.generation), span)
            .with_formatter(Arc::clone(&self.formatter))
    }

    /// Open a new session and return its id.
    pub fn open_session(&self) -> Uuid {
        let id = Uuid::now_v7();
        let session = ChatSession::new(self.new_adapter(id));
        self.sessions.insert(id, Arc::new(session));
        tracing::info!(session_id = %id, open_sessions = self.sessions.len(), "Session opened");
        id
    }

    /// Look up an open session and mark it active.
    pub fn session(&self, id: &Uuid) -> Result<Arc<ChatSession>, SessionError> {
        let session = self
            .sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SessionError::NotFound(*id))?;
        session.touch();
        Ok(session)
    }

    /// End a session. Its conversation is dropped once any in-flight
    /// submission finishes.
    pub fn close_session(&self, id: &Uuid) -> Result<(), SessionError> {
        self.sessions
            .remove(id)
            .map(|_| tracing::info!(session_id = %id, "Session closed"))
            .ok_or(SessionError::NotFound(*id))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Close every session idle for at least `max_idle`. Sessions with a
    /// submission in flight are kept. Returns how many were closed.
    pub fn expire_idle_sessions(&self, max_idle: Duration) -> usize {
        let mut expired = 0;
        self.sessions.retain(|id, session| {
            if session.is_busy() || session.idle_for() < max_idle {
                return true;
            }
            tracing::info!(session_id = %id, idle_secs = session.idle_for().as_secs(), "Session expired");
            expired += 1;
            false
        });
        expired
    }

    /// Periodically expire idle sessions. Runs until the task is dropped.
    pub async fn run_session_sweeper(self, max_idle: Duration) {
        let period = max_idle.min(Duration::from_secs(60)).max(Duration::from_secs(1));
        tracing::info!(idle_timeout_secs = max_idle.as_secs(), "Session sweeper started");

        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let expired = self.expire_idle_sessions(max_idle);
            if expired > 0 {
                tracing::debug!(expired, open_sessions = self.session_count(), "Idle sessions swept");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bedchat_core::llm::client::InferenceClient;
    use bedchat_types::chat::Role;
    use bedchat_types::llm::{InferenceRequest, InferenceResponse, LlmError};

    struct FixedClient;

    impl InferenceClient for FixedClient {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn converse(
            &self,
            _request: &InferenceRequest,
        ) -> Result<InferenceResponse, LlmError> {
            Ok(InferenceResponse::from_text("Hello!"))
        }
    }

    fn state() -> AppState {
        AppState::new(BoxInferenceClient::new(FixedClient), GenerationConfig::default())
    }

    #[test]
    fn test_open_and_close_session() {
        let state = state();
        let id = state.open_session();
        assert_eq!(state.session_count(), 1);
        assert!(state.session(&id).is_ok());

        state.close_session(&id).unwrap();
        assert!(matches!(state.session(&id), Err(SessionError::NotFound(_))));
        assert!(state.close_session(&id).is_err());
    }

    #[test]
    fn test_sessions_are_independent() {
        let state = state();
        let a = state.open_session();
        let b = state.open_session();
        assert_ne!(a, b);
        assert_eq!(state.session_count(), 2);
    }

    #[tokio::test]
    async fn test_submit_publishes_view() {
        let state = state();
        let id = state.open_session();
        let session = state.session(&id).unwrap();
        let mut updates = Vec::new();

        let outcome = session
            .submit("Hi".to_string(), |turns| updates.push(turns.len()))
            .await;

        assert_eq!(outcome, TurnOutcome::Replied);
        assert_eq!(updates, vec![1, 2]);
        assert_eq!(
            session.turns(),
            vec![Turn::user("Hi"), Turn::assistant("Hello!")]
        );
    }

    #[tokio::test]
    async fn test_other_session_untouched() {
        let state = state();
        let a = state.open_session();
        let b = state.open_session();

        state
            .session(&a)
            .unwrap()
            .submit("Hi".to_string(), |_| {})
            .await;

        assert!(state.session(&b).unwrap().turns().is_empty());
    }

    struct SlowClient {
        in_flight: Arc<std::sync::atomic::AtomicUsize>,
        max_in_flight: Arc<std::sync::atomic::AtomicUsize>,
    }

    impl InferenceClient for SlowClient {
        fn name(&self) -> &str {
            "slow"
        }

        async fn converse(
            &self,
            _request: &InferenceRequest,
        ) -> Result<InferenceResponse, LlmError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(InferenceResponse::from_text("done"))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submits_on_one_session_run_one_at_a_time() {
        let max_in_flight = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let client = SlowClient {
            in_flight: Arc::new(std::sync::atomic::AtomicUsize::new(0)),
            max_in_flight: Arc::clone(&max_in_flight),
        };
        let state = AppState::new(BoxInferenceClient::new(client), GenerationConfig::default());
        let id = state.open_session();
        let session = state.session(&id).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let session = Arc::clone(&session);
                tokio::spawn(async move { session.submit(format!("message {i}"), |_| {}).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), TurnOutcome::Replied);
        }

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        let turns = session.turns();
        assert_eq!(turns.len(), 8);
        for (i, turn) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role(), expected);
        }
    }

    #[test]
    fn test_expire_idle_sessions_closes_idle() {
        let state = state();
        state.open_session();
        state.open_session();

        assert_eq!(state.expire_idle_sessions(Duration::from_secs(3600)), 0);
        assert_eq!(state.session_count(), 2);

        assert_eq!(state.expire_idle_sessions(Duration::ZERO), 2);
        assert_eq!(state.session_count(), 0);
    }

    #[tokio::test]
    async fn test_expire_idle_sessions_keeps_busy_session() {
        let state = state();
        let id = state.open_session();
        let session = state.session(&id).unwrap();

        let guard = session.adapter.lock().await;
        assert!(session.is_busy());
        assert_eq!(state.expire_idle_sessions(Duration::ZERO), 0);
        assert!(state.session(&id).is_ok());

        drop(guard);
        assert_eq!(state.expire_idle_sessions(Duration::ZERO), 1);
        assert!(state.session(&id).is_err());
    }
}
