//! Session event types

use serde::{Deserialize, Serialize};

use crate::monitor::ConnectionState;

/// Events emitted while the session runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A health check changed the connection indicator
    ConnectionChanged { state: ConnectionState },

    /// An attempt failed and another will follow after `delay_ms`
    Retrying {
        attempt: u32,
        max_retries: u32,
        delay_ms: u64,
        error: String,
    },

    /// Analysis finished successfully
    AnalysisCompleted { intents: Vec<String> },

    /// Analysis failed after all attempts
    AnalysisFailed { attempts: u32, message: String },

    /// Conversation and panel were cleared
    Cleared,
}

impl SessionEvent {
    /// Check if this event ends a submission
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::AnalysisCompleted { .. } | SessionEvent::AnalysisFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(SessionEvent::AnalysisCompleted { intents: vec![] }.is_terminal());
        assert!(
            SessionEvent::AnalysisFailed {
                attempts: 4,
                message: "HTTP 500: Internal Server Error".into()
            }
            .is_terminal()
        );
        assert!(!SessionEvent::Cleared.is_terminal());
    }

    #[test]
    fn test_serialized_tag() {
        let event = SessionEvent::ConnectionChanged {
            state: ConnectionState::Connected {
                device: Some("GPU".into()),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "connection_changed");
        assert_eq!(json["state"]["state"], "connected");
        assert_eq!(json["state"]["device"], "GPU");
    }
}
