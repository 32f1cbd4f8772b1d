//! vintent-client: HTTP access to the intent-analysis service
//!
//! This crate owns the wire types returned by the NLU server and a small
//! reqwest-based client for its `/health` and `/parse` endpoints.

pub mod client;
pub mod error;
pub mod types;

pub use client::{DEFAULT_BASE_URL, NluClient, NluService};
pub use error::{Error, Result};
pub use types::*;

pub use indexmap;
