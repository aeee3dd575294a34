use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::model::PingResult;

pub const RESULTS_PATH: &str = "/ping-results";

// request timeout is deliberately kept at the poll interval so a hung
// backend cannot stack up requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// What went wrong talking to the backend. The watch poller keeps the
/// last good snapshot on any of these; the agent logs and drops the batch.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, broken transfer.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-2xx status.
    #[error("backend returned {0}")]
    Status(StatusCode),
    /// The body was not the documented JSON array of results.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thin client for the backend `/ping-results` endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    results_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            results_url: format!("{}{}", base_url.trim_end_matches('/'), RESULTS_PATH),
        })
    }

    /// Fetch the complete current result list.
    pub async fn fetch_ping_results(&self) -> Result<Vec<PingResult>, ApiError> {
        let response = self.http.get(&self.results_url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Push one batch of measured results.
    pub async fn push_ping_results(&self, batch: &[PingResult]) -> Result<(), ApiError> {
        let response = self.http.post(&self.results_url).json(batch).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(())
    }

    pub fn results_url(&self) -> &str {
        &self.results_url
    }
}
