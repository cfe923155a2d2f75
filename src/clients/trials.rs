//! ClinicalTrials.gov lookup client
//!
//! Fetches trial records by NCT ID and extracts the brief summary and
//! eligibility criteria the prompt needs. Raw trial JSON is memoized in the
//! result cache under `trial:{nct_id}`; a cache failure degrades to a plain
//! fetch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cache::ResultCache;

const CTGOV_BASE_URL: &str = "https://clinicaltrials.gov/api/v2";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Trial lookup failures; all of them are fatal for the request
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("no result found for NCT ID {0}")]
    NotFound(String),

    #[error("brief summary or eligibility missing for: {0}")]
    Incomplete(String),

    #[error("trial fetch failed: {0}")]
    Fetch(String),
}

/// The two trial fields the creatives prompt is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialSummary {
    pub brief_summary: String,
    pub eligibility: String,
}

/// Retry configuration for the upstream fetch
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum retry attempts
    pub max_retries: u32,
    /// Base delay time (milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay time (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10000,
        }
    }
}

/// ClinicalTrials.gov API client
pub struct TrialClient {
    http: Client,
    base_url: String,
    cache: Arc<dyn ResultCache>,
    retry_config: RetryConfig,
}

impl TrialClient {
    /// Create a client against the production endpoint
    pub fn new(cache: Arc<dyn ResultCache>) -> Result<Self> {
        Self::with_base_url(cache, CTGOV_BASE_URL, RetryConfig::default())
    }

    /// Create a client against a non-default endpoint
    pub fn with_base_url(
        cache: Arc<dyn ResultCache>,
        base_url: &str,
        retry_config: RetryConfig,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("aimgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            retry_config,
        })
    }

    /// Get the brief summary and eligibility criteria for a trial
    pub async fn desc_eligibility(&self, nct_id: &str) -> Result<TrialSummary, TrialError> {
        let trial = self.trial_record(nct_id).await?;

        let brief_summary = trial
            .pointer("/protocolSection/descriptionModule/briefSummary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let eligibility = trial
            .pointer("/protocolSection/eligibilityModule/eligibilityCriteria")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if brief_summary.is_empty() || eligibility.is_empty() {
            return Err(TrialError::Incomplete(nct_id.to_string()));
        }

        Ok(TrialSummary {
            brief_summary,
            eligibility,
        })
    }

    /// Cache key for a trial record. Namespaced so trial entries never
    /// collide with resolver entries in a shared backend.
    fn cache_key(nct_id: &str) -> String {
        format!("trial:{}", nct_id)
    }

    /// Get the full trial record, cache-first
    async fn trial_record(&self, nct_id: &str) -> Result<Value, TrialError> {
        let key = Self::cache_key(nct_id);
        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(trial) => {
                    info!("Trial {} found in cache", nct_id);
                    return Ok(trial);
                }
                Err(e) => warn!("Discarding undeserializable cached trial {}: {}", nct_id, e),
            },
            Ok(None) => info!("Trial {} not in cache, fetching from API", nct_id),
            Err(e) => error!("Cache read failed for trial {}: {}", nct_id, e),
        }

        let trial = self.fetch_with_retry(nct_id).await?;

        match serde_json::to_string(&trial) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(&key, &raw).await {
                    error!("Cache write failed for trial {}: {}", nct_id, e);
                }
            }
            Err(e) => error!("Failed to serialize trial {} for caching: {}", nct_id, e),
        }

        Ok(trial)
    }

    /// Fetch the trial record with exponential backoff
    ///
    /// A 404 fails immediately; transport errors and 5xx responses are
    /// retried up to the configured limit.
    async fn fetch_with_retry(&self, nct_id: &str) -> Result<Value, TrialError> {
        let url = format!("{}/studies/{}", self.base_url, nct_id);
        let mut last_error = String::new();

        for attempt in 0..=self.retry_config.max_retries {
            if attempt > 0 {
                let delay = (self.retry_config.base_delay_ms * 2u64.pow(attempt - 1))
                    .min(self.retry_config.max_delay_ms);
                warn!(
                    "Retrying trial fetch for {} (attempt {}/{}) after {}ms",
                    nct_id, attempt, self.retry_config.max_retries, delay
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let response = match self.http.get(&url).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(TrialError::NotFound(nct_id.to_string()));
            }
            if status.is_server_error() {
                last_error = format!("upstream returned {}", status);
                continue;
            }
            if !status.is_success() {
                return Err(TrialError::Fetch(format!("upstream returned {}", status)));
            }

            return response
                .json()
                .await
                .map_err(|e| TrialError::Fetch(e.to_string()));
        }

        Err(TrialError::Fetch(last_error))
    }
}
