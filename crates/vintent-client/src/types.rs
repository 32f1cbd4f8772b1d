//! Wire types for the NLU service

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Body of `POST /parse`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequest {
    pub utterance: String,
}

impl ParseRequest {
    pub fn new(utterance: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
        }
    }
}

/// Body of a successful `GET /health`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    /// Backend the model runs on, e.g. "GPU" or "CPU"
    pub device: Option<String>,
}

/// Result of intent analysis.
///
/// Every field is optional. The server may omit any of them and the client
/// must still render something sensible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    /// Detected intent labels, in server order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<String>>,

    /// Per-intent probability in [0, 1], in server order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<IndexMap<String, f64>>,

    /// Tokenizer and model internals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

/// Debug payload attached to an analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugInfo {
    /// Word-level segmentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokenized: Option<Vec<String>>,

    /// Byte-pair-encoded subword tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpe: Option<Vec<String>>,

    /// Leading dimensions of the classification-head input vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h_cls_sample: Option<Vec<f64>>,
}

impl AnalysisResult {
    /// Intent labels, empty when the server sent none
    pub fn intents(&self) -> &[String] {
        self.intents.as_deref().unwrap_or_default()
    }

    pub fn tokenized(&self) -> &[String] {
        self.debug_info
            .as_ref()
            .and_then(|d| d.tokenized.as_deref())
            .unwrap_or_default()
    }

    pub fn bpe(&self) -> &[String] {
        self.debug_info
            .as_ref()
            .and_then(|d| d.bpe.as_deref())
            .unwrap_or_default()
    }

    pub fn h_cls_sample(&self) -> &[f64] {
        self.debug_info
            .as_ref()
            .and_then(|d| d.h_cls_sample.as_deref())
            .unwrap_or_default()
    }
}
