//! Per-customer, per-service provider configuration resolution
//!
//! Joins a customer's provider subscriptions against the requested service's
//! provider list, validating each merged candidate into a
//! [`ProviderServiceConfig`]. Resolution is fronted by the result cache with
//! the key `aim:{customer}:{service}` and writes the raw candidate map back
//! through on every resolve, hit or miss. Cache failures always degrade to
//! miss/skip; they never abort the caller.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cache::ResultCache;
use crate::config::ConfigStore;

/// Fatal resolution failures
///
/// Any of these aborts the whole request before fan-out; per-provider
/// validation problems are recorded as [`ResolvedProvider::Invalid`] instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("customer '{0}' not found")]
    CustomerNotFound(String),

    #[error("customer '{0}' has no AI subscriptions")]
    NoSubscriptions(String),

    #[error("no AI configs for customer: {customer}; service: {service}")]
    NoServiceConfig { customer: String, service: String },

    #[error("no valid {service} config for {customer}")]
    NoValidConfig { customer: String, service: String },
}

/// Raw merged candidate, as stored in the cache
///
/// All fields are optional; validation into [`ProviderServiceConfig`] happens
/// after the cache round-trip so a stale or hand-edited cache entry can never
/// bypass it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateConfig {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Validated per-provider service configuration
///
/// Construction goes through `TryFrom<CandidateConfig>` only; `provider`,
/// `model` and `api_key` are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderServiceConfig {
    pub provider: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub api_key: String,
}

impl TryFrom<CandidateConfig> for ProviderServiceConfig {
    type Error = String;

    fn try_from(candidate: CandidateConfig) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let provider = non_empty(candidate.provider, "provider", &mut errors);
        let model = non_empty(candidate.model, "model", &mut errors);
        let api_key = non_empty(candidate.api_key, "api_key", &mut errors);

        if !errors.is_empty() {
            return Err(errors.join(","));
        }

        Ok(Self {
            provider: provider.unwrap_or_default(),
            model: model.unwrap_or_default(),
            temperature: candidate.temperature,
            api_key: api_key.unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(format!("Field: {}, Err: missing or empty", field));
            None
        }
    }
}

/// Outcome of resolving one provider named by the service entry
#[derive(Debug, Clone)]
pub enum ResolvedProvider {
    /// Validated and ready to fan out
    Ready(ProviderServiceConfig),
    /// Failed validation; the error string is kept so siblings still run
    Invalid(String),
}

impl ResolvedProvider {
    pub fn as_ready(&self) -> Option<&ProviderServiceConfig> {
        match self {
            ResolvedProvider::Ready(config) => Some(config),
            ResolvedProvider::Invalid(_) => None,
        }
    }
}

/// Resolves per-customer, per-service provider configurations
pub struct ConfigResolver {
    store: ConfigStore,
    cache: Arc<dyn ResultCache>,
}

impl ConfigResolver {
    pub fn new(store: ConfigStore, cache: Arc<dyn ResultCache>) -> Self {
        Self { store, cache }
    }

    fn cache_key(customer: &str, service: &str) -> String {
        format!("aim:{}:{}", customer, service)
    }

    /// Resolve the provider configurations for a customer and service
    ///
    /// Partial-success policy: providers that fail validation come back as
    /// [`ResolvedProvider::Invalid`] next to their valid siblings. Only the
    /// request-wide failures in [`ResolveError`] are fatal.
    pub async fn resolve(
        &self,
        customer: &str,
        service: &str,
    ) -> Result<HashMap<String, ResolvedProvider>, ResolveError> {
        let key = Self::cache_key(customer, service);

        let candidates = match self.cached_candidates(&key, customer, service).await {
            Some(cached) => cached,
            None => self.collect_candidates(customer, service)?,
        };

        if candidates.is_empty() {
            return Err(ResolveError::NoValidConfig {
                customer: customer.to_string(),
                service: service.to_string(),
            });
        }

        // Write-through on every resolve, including after a hit.
        self.write_back(&key, customer, service, &candidates).await;

        let resolved = candidates
            .into_iter()
            .map(|(provider, candidate)| {
                let outcome = match ProviderServiceConfig::try_from(candidate) {
                    Ok(config) => ResolvedProvider::Ready(config),
                    Err(errors) => {
                        warn!(
                            "Provider '{}' failed validation for {}/{}: {}",
                            provider, customer, service, errors
                        );
                        ResolvedProvider::Invalid(errors)
                    }
                };
                (provider, outcome)
            })
            .collect();

        Ok(resolved)
    }

    /// Read the candidate map from the cache, treating every failure as a miss
    async fn cached_candidates(
        &self,
        key: &str,
        customer: &str,
        service: &str,
    ) -> Option<HashMap<String, CandidateConfig>> {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("Cache miss for customer: {}, service: {}", customer, service);
                return None;
            }
            Err(e) => {
                error!("Cache read failed for key {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(candidates) => {
                info!("Cache hit for customer: {}, service: {}", customer, service);
                Some(candidates)
            }
            Err(e) => {
                warn!("Discarding undeserializable cache entry for {}: {}", key, e);
                None
            }
        }
    }

    /// Best-effort cache write; failures are logged and swallowed
    async fn write_back(
        &self,
        key: &str,
        customer: &str,
        service: &str,
        candidates: &HashMap<String, CandidateConfig>,
    ) {
        let snapshot = match serde_json::to_string(candidates) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Failed to serialize candidate map for {}: {}", key, e);
                return;
            }
        };

        match self.cache.set(key, &snapshot).await {
            Ok(()) => info!("Cached configs for customer: {}, service: {}", customer, service),
            Err(e) => error!("Cache write failed for key {}: {}", key, e),
        }
    }

    /// Walk the config store and merge credentials with service parameters
    fn collect_candidates(
        &self,
        customer: &str,
        service: &str,
    ) -> Result<HashMap<String, CandidateConfig>, ResolveError> {
        let customer_config = self.store.customer(customer).ok_or_else(|| {
            error!("Customer '{}' not found", customer);
            ResolveError::CustomerNotFound(customer.to_string())
        })?;

        let subscriptions = &customer_config.ai_providers;
        if subscriptions.is_empty() {
            error!("{} has no AI subscriptions", customer);
            return Err(ResolveError::NoSubscriptions(customer.to_string()));
        }

        let service_entries = customer_config
            .services
            .get(service)
            .filter(|entries| !entries.is_empty())
            .ok_or_else(|| {
                error!("No AI configs for customer: {}; service: {}", customer, service);
                ResolveError::NoServiceConfig {
                    customer: customer.to_string(),
                    service: service.to_string(),
                }
            })?;

        let mut candidates = HashMap::new();
        for entry in service_entries {
            for (provider, params) in entry {
                // Providers listed by the service but not subscribed to are
                // skipped entirely, not reported.
                if let Some(credential) = subscriptions.get(provider) {
                    candidates.insert(
                        provider.clone(),
                        CandidateConfig {
                            provider: Some(provider.clone()),
                            model: params.model.clone(),
                            temperature: params.temperature,
                            api_key: Some(credential.api_key.clone()),
                        },
                    );
                }
            }
        }

        Ok(candidates)
    }
}
