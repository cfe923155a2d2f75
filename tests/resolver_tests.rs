//! Config resolver integration tests
//!
//! Covers the fatal error taxonomy, the partial-success policy for invalid
//! providers, and cache round-trip / degradation behavior

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use aimgen::cache::{MemoryCache, ResultCache};
use aimgen::config::ConfigStore;
use aimgen::resolver::{CandidateConfig, ConfigResolver, ResolveError, ResolvedProvider};

/// Cache backend that fails every operation
struct FailingCache;

#[async_trait]
impl ResultCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("cache backend unreachable"))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("cache backend unreachable"))
    }
}

fn acme_store() -> ConfigStore {
    ConfigStore::from_json_str(
        r#"{
            "acmeinc": {
                "aiProviders": {
                    "openAI": {"api_key": "sk-oai-test"},
                    "anthropic": {"api_key": "sk-ant-test"}
                },
                "creatives": [
                    {"openAI": {"model": "gpt-4o-2024-08-06", "temperature": 0.7}},
                    {"anthropic": {"model": "claude-3-5-sonnet-20240620", "temperature": 0.7}}
                ]
            },
            "globex": {
                "aiProviders": {},
                "creatives": [
                    {"openAI": {"model": "gpt-4o"}}
                ]
            }
        }"#,
    )
    .unwrap()
}

fn resolver_with(store: ConfigStore, cache: Arc<dyn ResultCache>) -> ConfigResolver {
    ConfigResolver::new(store, cache)
}

#[tokio::test]
async fn resolves_both_subscribed_providers() {
    let resolver = resolver_with(acme_store(), Arc::new(MemoryCache::new()));

    let resolved = resolver.resolve("acmeinc", "creatives").await.unwrap();
    assert_eq!(resolved.len(), 2);

    let openai = resolved["openAI"].as_ready().unwrap();
    assert_eq!(openai.provider, "openAI");
    assert_eq!(openai.model, "gpt-4o-2024-08-06");
    assert_eq!(openai.temperature, Some(0.7));
    assert_eq!(openai.api_key, "sk-oai-test");

    let anthropic = resolved["anthropic"].as_ready().unwrap();
    assert_eq!(anthropic.model, "claude-3-5-sonnet-20240620");
}

#[tokio::test]
async fn unknown_customer_is_fatal() {
    let resolver = resolver_with(acme_store(), Arc::new(MemoryCache::new()));

    let err = resolver.resolve("initech", "creatives").await.unwrap_err();
    assert_eq!(err, ResolveError::CustomerNotFound("initech".to_string()));
}

#[tokio::test]
async fn customer_without_subscriptions_is_fatal() {
    let resolver = resolver_with(acme_store(), Arc::new(MemoryCache::new()));

    let err = resolver.resolve("globex", "creatives").await.unwrap_err();
    assert_eq!(err, ResolveError::NoSubscriptions("globex".to_string()));
}

#[tokio::test]
async fn missing_service_entry_is_fatal() {
    let resolver = resolver_with(acme_store(), Arc::new(MemoryCache::new()));

    let err = resolver.resolve("acmeinc", "prescreener").await.unwrap_err();
    assert_eq!(
        err,
        ResolveError::NoServiceConfig {
            customer: "acmeinc".to_string(),
            service: "prescreener".to_string(),
        }
    );
}

#[tokio::test]
async fn zero_provider_overlap_is_fatal() {
    // The service lists a provider the customer does not subscribe to.
    let store = ConfigStore::from_json_str(
        r#"{
            "acmeinc": {
                "aiProviders": {"openAI": {"api_key": "sk-test"}},
                "creatives": [
                    {"replicate": {"model": "llama-3"}}
                ]
            }
        }"#,
    )
    .unwrap();
    let resolver = resolver_with(store, Arc::new(MemoryCache::new()));

    let err = resolver.resolve("acmeinc", "creatives").await.unwrap_err();
    assert_eq!(
        err,
        ResolveError::NoValidConfig {
            customer: "acmeinc".to_string(),
            service: "creatives".to_string(),
        }
    );
}

#[tokio::test]
async fn invalid_provider_recorded_next_to_valid_sibling() {
    // anthropic has an empty credential; openAI is fine.
    let store = ConfigStore::from_json_str(
        r#"{
            "acmeinc": {
                "aiProviders": {
                    "openAI": {"api_key": "sk-test"},
                    "anthropic": {"api_key": ""}
                },
                "creatives": [
                    {"openAI": {"model": "gpt-4o"}},
                    {"anthropic": {"model": "claude-3-5-sonnet-20240620"}}
                ]
            }
        }"#,
    )
    .unwrap();
    let resolver = resolver_with(store, Arc::new(MemoryCache::new()));

    let resolved = resolver.resolve("acmeinc", "creatives").await.unwrap();
    assert_eq!(resolved.len(), 2);
    assert!(resolved["openAI"].as_ready().is_some());

    match &resolved["anthropic"] {
        ResolvedProvider::Invalid(errors) => assert!(errors.contains("api_key")),
        ResolvedProvider::Ready(_) => panic!("expected anthropic to fail validation"),
    }
}

#[tokio::test]
async fn cache_round_trip_stores_full_snapshot() {
    let cache = Arc::new(MemoryCache::new());
    let resolver = resolver_with(acme_store(), cache.clone());

    resolver.resolve("acmeinc", "creatives").await.unwrap();

    let raw = cache.get("aim:acmeinc:creatives").await.unwrap().unwrap();
    let snapshot: HashMap<String, CandidateConfig> = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["openAI"].api_key.as_deref(), Some("sk-oai-test"));
    assert_eq!(
        snapshot["anthropic"].model.as_deref(),
        Some("claude-3-5-sonnet-20240620")
    );
}

#[tokio::test]
async fn cache_hit_skips_the_store_walk() {
    let cache = Arc::new(MemoryCache::new());

    // Populate the cache with one resolver, then resolve against a store
    // that no longer knows the customer.
    let warm = resolver_with(acme_store(), cache.clone());
    warm.resolve("acmeinc", "creatives").await.unwrap();

    let empty_store = ConfigStore::from_json_str("{}").unwrap();
    let cold = resolver_with(empty_store, cache);

    let resolved = cold.resolve("acmeinc", "creatives").await.unwrap();
    assert_eq!(resolved.len(), 2);
    assert!(resolved["openAI"].as_ready().is_some());
}

#[tokio::test]
async fn unreachable_cache_degrades_to_miss() {
    let resolver = resolver_with(acme_store(), Arc::new(FailingCache));

    // Both the failed read and the failed write must stay internal.
    let resolved = resolver.resolve("acmeinc", "creatives").await.unwrap();
    assert_eq!(resolved.len(), 2);
}

#[tokio::test]
async fn corrupt_cache_entry_treated_as_miss() {
    let cache = Arc::new(MemoryCache::new());
    cache
        .set("aim:acmeinc:creatives", "not valid json {")
        .await
        .unwrap();

    let resolver = resolver_with(acme_store(), cache.clone());
    let resolved = resolver.resolve("acmeinc", "creatives").await.unwrap();
    assert_eq!(resolved.len(), 2);

    // The corrupt entry was overwritten by the write-through.
    let raw = cache.get("aim:acmeinc:creatives").await.unwrap().unwrap();
    assert!(serde_json::from_str::<HashMap<String, CandidateConfig>>(&raw).is_ok());
}

#[tokio::test]
async fn store_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "acmeinc": {{
                "aiProviders": {{"openAI": {{"api_key": "sk-file"}}}},
                "creatives": [{{"openAI": {{"model": "gpt-4o"}}}}]
            }}
        }}"#
    )
    .unwrap();

    let store = ConfigStore::from_file(file.path()).unwrap();
    let resolver = resolver_with(store, Arc::new(MemoryCache::new()));

    let resolved = resolver.resolve("acmeinc", "creatives").await.unwrap();
    assert_eq!(
        resolved["openAI"].as_ready().unwrap().api_key,
        "sk-file"
    );
}
