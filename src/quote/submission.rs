//! Submission of a completed quote to the remote quote service.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::SubmissionConfig;
use crate::pricing::PricingBreakdown;

use super::models::QuoteDraft;

/// Body POSTed to the quote service: the draft fields, its pricing and the
/// time of submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload {
    #[serde(flatten)]
    pub draft: QuoteDraft,
    pub pricing: PricingBreakdown,
    pub timestamp: DateTime<Utc>,
}

/// Acknowledgement returned by the quote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub quote_id: String,
}

/// Submission error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("quote service responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response from quote service: {0}")]
    InvalidResponse(String),

    #[error("submission cancelled")]
    Cancelled,
}

impl SubmissionError {
    /// Worth another attempt without changing the request.
    pub fn is_retryable(&self) -> bool {
        match self {
            SubmissionError::Network(_) | SubmissionError::Timeout => true,
            SubmissionError::Status { status, .. } => {
                *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
            }
            SubmissionError::InvalidResponse(_) | SubmissionError::Cancelled => false,
        }
    }

    /// Message suitable for showing to the customer.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmissionError::Cancelled => "Your quote request was cancelled.",
            _ => "We couldn't send your quote request. Please check your connection and try again.",
        }
    }
}

/// The remote collaborator that accepts finished quotes.
pub trait SubmissionGateway: Send + Sync {
    fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<SubmissionReceipt, SubmissionError>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptBody {
    quote_id: Option<String>,
}

/// JSON-over-HTTP gateway with a per-request timeout and exponential backoff
/// on transient failures.
#[derive(Debug, Clone)]
pub struct HttpSubmissionGateway {
    client: Client,
    endpoint: Url,
    max_retries: u32,
    initial_backoff: Duration,
}

impl HttpSubmissionGateway {
    pub fn new(endpoint: Url, timeout: Duration, max_retries: u32) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmissionError::Network(format!("failed to create HTTP client: {}", e)))?;

        tracing::info!(endpoint = %endpoint, "Quote submission client initialized");

        Ok(Self {
            client,
            endpoint,
            max_retries,
            initial_backoff: Duration::from_millis(500),
        })
    }

    pub fn from_config(config: &SubmissionConfig) -> Result<Self, SubmissionError> {
        Self::new(config.endpoint.clone(), config.timeout, config.max_retries)
    }

    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_once(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .filter(|body| !body.trim().is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(SubmissionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: ReceiptBody = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SubmissionError::Timeout
            } else {
                SubmissionError::InvalidResponse(e.to_string())
            }
        })?;

        match body.quote_id {
            Some(quote_id) if !quote_id.is_empty() => Ok(SubmissionReceipt { quote_id }),
            _ => Err(SubmissionError::InvalidResponse(
                "response is missing quoteId".to_string(),
            )),
        }
    }
}

impl SubmissionGateway for HttpSubmissionGateway {
    #[instrument(skip(self, payload), fields(endpoint = %self.endpoint))]
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_max_elapsed_time(None)
            .build();

        let max_retries = self.max_retries;
        let mut attempt = 0u32;

        backoff::future::retry_notify(
            policy,
            || {
                attempt += 1;
                let this_attempt = attempt;
                async move {
                    debug!(attempt = this_attempt, "Posting quote");
                    self.post_once(payload).await.map_err(|e| {
                        if e.is_retryable() && this_attempt <= max_retries {
                            backoff::Error::transient(e)
                        } else {
                            backoff::Error::permanent(e)
                        }
                    })
                }
            },
            |e: SubmissionError, wait: Duration| {
                warn!(error = %e, wait_ms = wait.as_millis() as u64, "Quote submission failed, retrying");
            },
        )
        .await
    }
}

fn classify(e: reqwest::Error) -> SubmissionError {
    if e.is_timeout() {
        SubmissionError::Timeout
    } else {
        SubmissionError::Network(e.to_string())
    }
}
