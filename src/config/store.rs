//! Static configuration store
//!
//! Maps customer -> subscribed AI providers (with credentials) and
//! customer -> service -> per-provider model parameters. The layout mimics a
//! service-discovery tree: a customer entry carries an `aiProviders` node plus
//! one node per service name, each listing the providers enabled for it.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::config::Settings;

/// Credential block for one subscribed provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCredential {
    #[serde(default)]
    pub api_key: String,
}

/// Per-service parameters for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProviderParams {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// One customer's configuration tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerConfig {
    /// Providers the customer subscribes to, keyed by provider key
    #[serde(rename = "aiProviders", default)]
    pub ai_providers: HashMap<String, ProviderCredential>,
    /// Service entries keyed by service name. Each entry is a list of
    /// provider maps; a single list item may name several providers.
    #[serde(flatten)]
    pub services: HashMap<String, Vec<HashMap<String, ServiceProviderParams>>>,
}

/// Static mapping of customer name to configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigStore {
    customers: HashMap<String, CustomerConfig>,
}

impl ConfigStore {
    /// Load the store according to the settings: from a JSON file when a path
    /// is configured, otherwise the built-in defaults
    pub fn load(settings: &Settings) -> Result<Self> {
        match &settings.store.path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Load the store from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config store file: {}", path.display()))?;

        let store = Self::from_json_str(&contents)
            .with_context(|| format!("Failed to parse config store file: {}", path.display()))?;

        info!(
            "Config store loaded from {} ({} customers)",
            path.display(),
            store.customers.len()
        );
        Ok(store)
    }

    /// Parse the store from a JSON string
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let customers: HashMap<String, CustomerConfig> =
            serde_json::from_str(contents).context("Invalid config store JSON")?;
        Ok(Self { customers })
    }

    /// Built-in store with credentials pulled from the environment
    pub fn builtin() -> Self {
        let defaults = json!({
            "acmeinc": {
                "aiProviders": {
                    "openAI": {
                        "api_key": std::env::var("OPENAI_API_KEY").unwrap_or_default()
                    },
                    "anthropic": {
                        "api_key": std::env::var("ANTHROPIC_API_KEY").unwrap_or_default()
                    }
                },
                "creatives": [
                    {"openAI": {
                        "model": "gpt-4o-2024-08-06",
                        "temperature": 0.7
                    }},
                    {"anthropic": {
                        "model": "claude-3-5-sonnet-20240620",
                        "temperature": 0.7
                    }}
                ],
                "prescreener": [
                    {
                        "openAI": {
                            "model": "gpt-4o-2024-08-06",
                            "temperature": 0.5
                        },
                        "anthropic": {
                            "model": "claude-3-5-sonnet-20240620",
                            "temperature": 0.5
                        }
                    }
                ]
            }
        });

        // The tree above is static; a parse failure here is a programming
        // error and must not degrade into an empty store.
        let customers = serde_json::from_value(defaults)
            .expect("Failed to parse built-in config store");
        Self { customers }
    }

    /// Look up a customer's configuration
    pub fn customer(&self, name: &str) -> Option<&CustomerConfig> {
        self.customers.get(name)
    }
}
