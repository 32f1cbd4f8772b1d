//! Request dispatcher: one analysis call with bounded retry

use std::{sync::Arc, time::Duration};

use tokio::sync::broadcast;
use vintent_client::{AnalysisResult, Error, NluService};

use crate::{error::AnalysisError, events::SessionEvent, retry::RetryPolicy};

/// Sends utterances to the service, retrying failures per [`RetryPolicy`].
///
/// Cheap to clone; the service is shared.
#[derive(Clone)]
pub struct Dispatcher {
    service: Arc<dyn NluService>,
    policy: RetryPolicy,
    attempt_timeout: Option<Duration>,
    event_tx: Option<broadcast::Sender<SessionEvent>>,
}

impl Dispatcher {
    /// Create a dispatcher with the default policy and no per-attempt timeout
    pub fn new(service: Arc<dyn NluService>) -> Self {
        Self {
            service,
            policy: RetryPolicy::default(),
            attempt_timeout: None,
            event_tx: None,
        }
    }

    /// Set retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound each attempt. `None` lets a hung attempt wait forever.
    pub fn with_attempt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Emit [`SessionEvent::Retrying`] on this channel
    pub fn with_events(mut self, tx: broadcast::Sender<SessionEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Analyze `text`, retrying with a fixed delay until the policy gives up
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let mut attempt = 0u32;

        loop {
            match self.attempt_once(text).await {
                Ok(result) => {
                    if attempt > 0 {
                        tracing::info!("Analysis succeeded on attempt {}", attempt + 1);
                    }
                    return Ok(result);
                }
                Err(e) if self.policy.should_retry(attempt, &e) => {
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        "Analysis failed (attempt {}/{}): {}. Retry {}/{} in {:?}",
                        attempt + 1,
                        self.policy.max_attempts(),
                        e,
                        attempt + 1,
                        self.policy.max_retries,
                        delay
                    );
                    self.emit(SessionEvent::Retrying {
                        attempt: attempt + 1,
                        max_retries: self.policy.max_retries,
                        delay_ms: delay.as_millis() as u64,
                        error: e.to_string(),
                    });
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("Error analyzing intent: {}", e);
                    return Err(AnalysisError {
                        attempts: attempt + 1,
                        source: e,
                    });
                }
            }
        }
    }

    async fn attempt_once(&self, text: &str) -> vintent_client::Result<AnalysisResult> {
        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, self.service.parse(text))
                .await
                .unwrap_or(Err(Error::Timeout(limit))),
            None => self.service.parse(text).await,
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}
