//! Error types for vintent-session

use thiserror::Error;

/// All attempts of an analysis call failed.
///
/// Displays as the last underlying failure so it can be shown to the user
/// verbatim.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct AnalysisError {
    /// Number of attempts made, including the first
    pub attempts: u32,
    /// The failure of the final attempt
    pub source: vintent_client::Error,
}

/// Why a submission was not started
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Nothing left after trimming
    #[error("message is empty")]
    Empty,

    /// Another analysis is still in flight
    #[error("an analysis is already in progress")]
    Busy,

    /// Last health check did not succeed
    #[error("Please check server connection")]
    Disconnected,
}
