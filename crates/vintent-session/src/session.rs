//! Chat session: the single state object every handler works on

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use tokio::sync::broadcast;
use vintent_client::{AnalysisResult, HealthStatus, NluService};

use crate::{
    conversation::{Conversation, EntryId},
    dispatcher::Dispatcher,
    error::{AnalysisError, SubmitRejected},
    events::SessionEvent,
    guard::{TaskGuard, TaskPermit},
    monitor::{ConnectionState, ConnectivityMonitor},
    panel::AnalysisView,
    retry::RetryPolicy,
};

/// Session tuning knobs
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Retry policy for `/parse`
    pub retry: RetryPolicy,
    /// Per-attempt deadline for `/parse`; `None` waits forever
    pub attempt_timeout: Option<Duration>,
    /// Health polling interval
    pub health_interval: Duration,
}

impl SessionConfig {
    pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            attempt_timeout: Some(Self::DEFAULT_ATTEMPT_TIMEOUT),
            health_interval: ConnectivityMonitor::DEFAULT_INTERVAL,
        }
    }
}

/// A started health check. Resolve it and hand the outcome to
/// [`ChatSession::record_health`].
pub type HealthCheck = Pin<Box<dyn Future<Output = vintent_client::Result<HealthStatus>> + Send>>;

/// An accepted submission. Holds the busy slot until handed back to
/// [`ChatSession::finish`] (or dropped).
#[derive(Debug)]
pub struct Submission {
    utterance: String,
    loading: EntryId,
    _permit: TaskPermit,
}

impl Submission {
    pub fn utterance(&self) -> &str {
        &self.utterance
    }

    /// Handle of the loading placeholder
    pub fn loading_id(&self) -> EntryId {
        self.loading
    }
}

/// Conversation, connection indicator, busy guard and analysis panel
pub struct ChatSession {
    service: Arc<dyn NluService>,
    dispatcher: Dispatcher,
    monitor: ConnectivityMonitor,
    guard: TaskGuard,
    conversation: Conversation,
    view: Option<AnalysisView>,
    health_in_flight: bool,
    /// Last settled connection state announced to subscribers
    reported: Option<ConnectionState>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl ChatSession {
    pub fn new(service: Arc<dyn NluService>, config: SessionConfig) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let dispatcher = Dispatcher::new(Arc::clone(&service))
            .with_policy(config.retry)
            .with_attempt_timeout(config.attempt_timeout)
            .with_events(event_tx.clone());

        Self {
            service,
            dispatcher,
            monitor: ConnectivityMonitor::new(config.health_interval),
            guard: TaskGuard::new(),
            conversation: Conversation::new(),
            view: None,
            health_in_flight: false,
            reported: None,
            event_tx,
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Dispatcher clone, for running an analysis without borrowing the session
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn connection(&self) -> &ConnectionState {
        self.monitor.state()
    }

    /// Outcome of the last finished health check. A check in flight does
    /// not change it.
    pub fn is_connected(&self) -> bool {
        self.reported
            .as_ref()
            .is_some_and(ConnectionState::is_connected)
    }

    pub fn health_interval(&self) -> Duration {
        self.monitor.interval()
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    /// Panel for the last successful analysis
    pub fn view(&self) -> Option<&AnalysisView> {
        self.view.as_ref()
    }

    // ===== Connectivity =====

    /// Start a scheduled or requested health check.
    ///
    /// Returns `None` while an analysis holds the busy slot or another check
    /// is still unresolved. Otherwise the indicator shows "Connecting..."
    /// until the outcome is passed to [`ChatSession::record_health`].
    pub fn start_health_check(&mut self) -> Option<HealthCheck> {
        if !self.monitor.should_tick(&self.guard) {
            tracing::debug!("health check skipped, analysis in flight");
            return None;
        }
        if self.health_in_flight {
            tracing::debug!("health check skipped, previous check pending");
            return None;
        }
        Some(self.launch_health_check())
    }

    fn launch_health_check(&mut self) -> HealthCheck {
        self.health_in_flight = true;
        self.monitor.begin_check();
        let service = Arc::clone(&self.service);
        Box::pin(async move { service.health().await })
    }

    /// Apply the outcome of a started health check
    pub fn record_health(&mut self, outcome: vintent_client::Result<HealthStatus>) {
        self.health_in_flight = false;
        let state = self.monitor.record(&outcome).clone();
        if self.reported.as_ref() != Some(&state) {
            self.reported = Some(state.clone());
            self.emit(SessionEvent::ConnectionChanged { state });
        }
    }

    /// Run a health check now and wait for it
    pub async fn check_health(&mut self) -> &ConnectionState {
        let outcome = self.launch_health_check().await;
        self.record_health(outcome);
        self.monitor.state()
    }

    // ===== Submission =====

    /// Validate and start a submission.
    ///
    /// Empty text and submissions while busy are silent no-ops. When the last
    /// health check failed a warning entry is added instead. On success the
    /// user message and loading placeholder are appended and the session is
    /// busy until the returned [`Submission`] is finished or dropped.
    pub fn begin_submission(&mut self, text: &str) -> Result<Submission, SubmitRejected> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitRejected::Empty);
        }
        if self.guard.is_busy() {
            return Err(SubmitRejected::Busy);
        }
        if !self.is_connected() {
            self.conversation
                .add_warning(&SubmitRejected::Disconnected.to_string());
            return Err(SubmitRejected::Disconnected);
        }

        let permit = self.guard.try_begin().ok_or(SubmitRejected::Busy)?;

        self.conversation.add_user_message(text);
        let loading = self.conversation.add_loading_message();

        Ok(Submission {
            utterance: text.to_string(),
            loading,
            _permit: permit,
        })
    }

    /// Finish a submission: swap the placeholder for the reply, update the
    /// panel on success, and release the busy slot.
    pub fn finish(
        &mut self,
        submission: Submission,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) {
        self.conversation.remove_message(submission.loading);

        match outcome {
            Ok(result) => {
                self.conversation.add_assistant_message(Ok(&result));
                self.emit(SessionEvent::AnalysisCompleted {
                    intents: result.intents().to_vec(),
                });
                self.view = Some(AnalysisView::from_result(&result));
            }
            Err(e) => {
                self.conversation.add_assistant_message(Err(&e));
                self.emit(SessionEvent::AnalysisFailed {
                    attempts: e.attempts,
                    message: e.to_string(),
                });
            }
        }

        drop(submission);
    }

    /// Submit `text` and wait for the outcome.
    ///
    /// Returns `Ok(true)` when the analysis succeeded and `Ok(false)` when it
    /// failed after all retries (the failure is in the conversation).
    pub async fn submit(&mut self, text: &str) -> Result<bool, SubmitRejected> {
        let submission = self.begin_submission(text)?;
        let outcome = self.dispatcher.analyze(submission.utterance()).await;
        let succeeded = outcome.is_ok();
        self.finish(submission, outcome);
        Ok(succeeded)
    }

    /// Clear conversation and panel
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.view = None;
        self.emit(SessionEvent::Cleared);
    }

    /// Add command output to the conversation
    pub fn show_system_message(&mut self, text: &str) {
        self.conversation.add_system_message(text);
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}
