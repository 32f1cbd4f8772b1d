//! HTTP client for the NLU service

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::{
    error::{Error, Result},
    types::{AnalysisResult, HealthStatus, ParseRequest},
};

/// Default service endpoint (an ngrok tunnel in front of the model server)
pub const DEFAULT_BASE_URL: &str = "https://hypothalamic-lianne-unfurnitured.ngrok-free.dev";

/// Header that suppresses ngrok's browser interstitial page
const NGROK_SKIP_WARNING: &str = "ngrok-skip-browser-warning";

/// Operations the session layer needs from the NLU service
#[async_trait]
pub trait NluService: Send + Sync {
    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus>;

    /// `POST /parse` for a single utterance
    async fn parse(&self, utterance: &str) -> Result<AnalysisResult>;
}

/// reqwest-backed implementation of [`NluService`]
#[derive(Debug, Clone)]
pub struct NluClient {
    client: reqwest::Client,
    base_url: String,
}

impl NluClient {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::InvalidConfig("API base URL is empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "API base URL must start with http:// or https://: {}",
                base_url
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(NGROK_SKIP_WARNING),
            HeaderValue::from_static("true"),
        );
        headers
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(status));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl NluService for NluClient {
    async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        tracing::debug!(%url, "health check");

        let response = self.client.get(&url).headers(Self::headers()).send().await?;
        Self::read_json(response).await
    }

    async fn parse(&self, utterance: &str) -> Result<AnalysisResult> {
        let url = format!("{}/parse", self.base_url);
        tracing::debug!(%url, chars = utterance.chars().count(), "parse request");

        let response = self
            .client
            .post(&url)
            .headers(Self::headers())
            .json(&ParseRequest::new(utterance))
            .send()
            .await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = NluClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(matches!(
            NluClient::new("   "),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_scheme_required() {
        assert!(matches!(
            NluClient::new("localhost:8000"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_default_base_url_accepted() {
        let client = NluClient::new(DEFAULT_BASE_URL).unwrap();
        assert!(client.base_url().ends_with(".ngrok-free.dev"));
    }

    #[test]
    fn test_headers_carry_tunnel_bypass() {
        let headers = NluClient::headers();
        assert_eq!(headers.get(NGROK_SKIP_WARNING).unwrap(), "true");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }
}
