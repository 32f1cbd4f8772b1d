//! vintent-session: request orchestration for the intent chat
//!
//! This crate holds everything between the key press and the HTTP call:
//! the busy guard, the fixed-delay retry loop, health polling, the
//! conversation log and the analysis panel model.

pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod guard;
pub mod monitor;
pub mod panel;
pub mod retry;
pub mod session;

pub use conversation::{Conversation, ConversationEntry, EntryId, EntryKind, Role, reply_text};
pub use dispatcher::Dispatcher;
pub use error::{AnalysisError, SubmitRejected};
pub use events::SessionEvent;
pub use guard::{TaskGuard, TaskPermit};
pub use monitor::{ConnectionState, ConnectivityMonitor};
pub use panel::{AnalysisView, TokenStyle};
pub use retry::RetryPolicy;
pub use session::{ChatSession, HealthCheck, SessionConfig, Submission};
