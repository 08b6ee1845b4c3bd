//! Metered usage source

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the usage API credential
pub const API_KEY_ENV: &str = "USAGE_API_KEY";

#[derive(Debug, Error)]
pub enum UsageFetchError {
    #[error("{0} missing; usage check skipped.")]
    MissingCredential(String),
    #[error("usage endpoint HTTP {0}")]
    Status(u16),
    #[error("usage fetch error: {0}")]
    Transport(String),
    #[error("usage response invalid: {0}")]
    Decode(String),
}

/// Period-to-date spend, in USD
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn period_to_date(&self) -> Result<f64, UsageFetchError>;
}

/// Usage accounting HTTP endpoint
pub struct HttpUsageSource {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpUsageSource {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        }
    }
}

/// First day of the current month through `today`
pub fn billing_period(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    (start, today)
}

#[async_trait]
impl UsageSource for HttpUsageSource {
    async fn period_to_date(&self) -> Result<f64, UsageFetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UsageFetchError::MissingCredential(API_KEY_ENV.to_string()))?;

        let (start, end) = billing_period(Local::now().date_naive());
        debug!("Fetching usage {} .. {} from {}", start, end, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
            ])
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| UsageFetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(UsageFetchError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UsageFetchError::Decode(e.to_string()))?;
        Ok(body
            .get("total_usage_usd")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0))
    }
}
