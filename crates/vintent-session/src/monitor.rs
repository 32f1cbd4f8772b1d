//! Connectivity monitor: health polling and the tri-state indicator

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vintent_client::HealthStatus;

use crate::guard::TaskGuard;

/// Device label shown when the health body does not name one
const DEFAULT_DEVICE: &str = "CPU";

/// Connection indicator state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    /// A check is in flight (also the state before the first check)
    #[default]
    Connecting,
    /// Last check succeeded
    Connected { device: Option<String> },
    /// Last check failed
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    /// Text for the status indicator
    pub fn label(&self) -> String {
        match self {
            ConnectionState::Connecting => "Connecting...".to_string(),
            ConnectionState::Connected { device } => format!(
                "Connected ({})",
                device.as_deref().unwrap_or(DEFAULT_DEVICE)
            ),
            ConnectionState::Disconnected => "Disconnected".to_string(),
        }
    }
}

/// Tracks server reachability.
///
/// Each check is independent: a failure is not retried, the next scheduled
/// tick is.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    state: ConnectionState,
    interval: Duration,
}

impl ConnectivityMonitor {
    /// Default polling interval
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    pub fn new(interval: Duration) -> Self {
        Self {
            state: ConnectionState::Connecting,
            interval,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a scheduled tick should run. Ticks are skipped while an
    /// analysis holds the guard.
    pub fn should_tick(&self, guard: &TaskGuard) -> bool {
        !guard.is_busy()
    }

    /// Mark a check as started
    pub fn begin_check(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// Apply the outcome of a health call
    pub fn record(&mut self, outcome: &vintent_client::Result<HealthStatus>) -> &ConnectionState {
        self.state = match outcome {
            Ok(health) => {
                tracing::debug!(device = ?health.device, "health check ok");
                ConnectionState::Connected {
                    device: health.device.clone(),
                }
            }
            Err(e) => {
                tracing::error!("Health check failed: {}", e);
                ConnectionState::Disconnected
            }
        };
        &self.state
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vintent_client::Error;

    #[test]
    fn test_labels() {
        assert_eq!(ConnectionState::Connecting.label(), "Connecting...");
        assert_eq!(ConnectionState::Disconnected.label(), "Disconnected");
        assert_eq!(
            ConnectionState::Connected { device: None }.label(),
            "Connected (CPU)"
        );
    }

    #[test]
    fn test_initial_state_is_connecting() {
        let monitor = ConnectivityMonitor::default();
        assert_eq!(monitor.state(), &ConnectionState::Connecting);
        assert!(!monitor.state().is_connected());
        assert_eq!(monitor.interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_gpu_device_connected() {
        let mut monitor = ConnectivityMonitor::default();
        let state = monitor.record(&Ok(HealthStatus {
            device: Some("GPU".into()),
        }));
        assert!(state.is_connected());
        assert!(state.label().contains("GPU"));
    }

    #[test]
    fn test_server_error_disconnects() {
        let mut monitor = ConnectivityMonitor::default();
        let outcome = Err(Error::Status {
            status: 500,
            reason: "Internal Server Error".into(),
        });
        assert_eq!(monitor.record(&outcome), &ConnectionState::Disconnected);
    }

    #[test]
    fn test_recovers_on_next_check() {
        let mut monitor = ConnectivityMonitor::default();
        monitor.record(&Err(Error::Timeout(Duration::from_secs(1))));
        assert_eq!(monitor.state(), &ConnectionState::Disconnected);

        monitor.begin_check();
        assert!(monitor.record(&Ok(HealthStatus::default())).is_connected());
    }

    #[test]
    fn test_begin_check_sets_connecting() {
        let mut monitor = ConnectivityMonitor::default();
        monitor.record(&Ok(HealthStatus::default()));
        monitor.begin_check();
        assert_eq!(monitor.state(), &ConnectionState::Connecting);
    }

    #[test]
    fn test_tick_skipped_while_busy() {
        let monitor = ConnectivityMonitor::default();
        let guard = TaskGuard::new();
        assert!(monitor.should_tick(&guard));
        let permit = guard.try_begin().unwrap();
        assert!(!monitor.should_tick(&guard));
        drop(permit);
        assert!(monitor.should_tick(&guard));
    }
}
