//! Provider client registry
//!
//! Runtime-populated mapping from provider key to client constructor. The
//! registry is assembled explicitly at startup and passed by reference to
//! whatever needs it; there is no ambient global and no implicit discovery.

use std::collections::HashMap;

use anyhow::Result;
use tracing::error;

use super::{AiClient, AnthropicClient, OpenAiClient};
use crate::resolver::ProviderServiceConfig;

/// Constructor for one provider's client
pub type ClientCtor = fn(&ProviderServiceConfig) -> Result<Box<dyn AiClient>>;

/// Mapping from provider key to client constructor
pub struct ClientRegistry {
    ctors: HashMap<String, ClientCtor>,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            ctors: HashMap::new(),
        }
    }

    /// Create a registry with every built-in client registered
    pub fn with_default_clients() -> Self {
        let mut registry = Self::new();
        registry.register("openAI", |config| {
            Ok(Box::new(OpenAiClient::new(config)?) as Box<dyn AiClient>)
        });
        registry.register("anthropic", |config| {
            Ok(Box::new(AnthropicClient::new(config)?) as Box<dyn AiClient>)
        });
        registry
    }

    /// Register a constructor for a provider key
    ///
    /// Re-registering a key overwrites the previous constructor.
    pub fn register(&mut self, key: impl Into<String>, ctor: ClientCtor) {
        self.ctors.insert(key.into(), ctor);
    }

    /// Construct a fresh client for the given key and resolved config
    ///
    /// Clients are not pooled; every call builds a new instance. An
    /// unregistered key or a failing constructor logs and returns `None`.
    pub fn get(&self, key: &str, config: &ProviderServiceConfig) -> Option<Box<dyn AiClient>> {
        let Some(ctor) = self.ctors.get(key) else {
            error!("No AI client registered for key: {}", key);
            return None;
        };

        match ctor(config) {
            Ok(client) => Some(client),
            Err(e) => {
                error!("Failed to construct AI client for key {}: {}", key, e);
                None
            }
        }
    }

    /// Registered provider keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.ctors.keys().map(String::as_str)
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::with_default_clients()
    }
}
