//! One request/response exchange against the remote estimator.

use crate::model::{EstimateOutcome, EstimateRequest};
use anyhow::{Context, Result};
use std::time::Duration;

/// Failure of the exchange itself, before a body could be parsed.
///
/// Service-reported errors are not represented here: a well-formed
/// `{ "error": ... }` body parses into `EstimateOutcome::ServiceError` and
/// counts as a completed exchange.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    /// The network exchange never completed (connect, timeout, aborted body).
    #[error("estimator unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// A body arrived but matched neither the report nor the error shape.
    #[error("unreadable estimator response: {0}")]
    Parse(#[from] serde_json::Error),
}

pub struct EstimationClient {
    http: reqwest::Client,
    base_url: String,
}

impl EstimationClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("cihub-cli/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST the request and parse whatever body comes back.
    ///
    /// The HTTP status is deliberately not consulted: only the body shape
    /// decides between a report and a service error, so a 4xx with a
    /// well-formed error body is still a completed exchange.
    pub async fn estimate(
        &self,
        request: &EstimateRequest,
    ) -> Result<EstimateOutcome, EstimateError> {
        let url = format!("{}/api/estimate", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
