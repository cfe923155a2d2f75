//! Provider client module
//!
//! Defines the AiClient capability trait, the structured-output contract and
//! the concrete provider implementations

pub mod anthropic;
pub mod openai;
pub mod registry;
pub mod trials;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::models::NeutralPrompt;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;
pub use registry::ClientRegistry;
pub use trials::TrialClient;

/// Declared shape of a structured-output response
///
/// Sent to the provider as a JSON-schema response format or a tool
/// declaration, depending on what the provider supports.
#[derive(Debug, Clone)]
pub struct OutputShape {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Value,
}

/// Application result shapes that providers can be asked to produce
pub trait StructuredOutput: DeserializeOwned + Serialize + Send + 'static {
    /// The schema declaration handed to the provider
    fn shape() -> OutputShape;

    /// Stamp the provider key that produced this instance
    fn set_source(&mut self, provider: &str);
}

/// Provider client capability
///
/// One implementation per AI provider. `invoke_raw` performs exactly one
/// network call regardless of the `retry` flag; retrying is a caller concern.
/// Implementations swallow every failure: a decode error, an empty choice
/// list or a transport error logs and returns `None` so that one provider's
/// failure can never abort its siblings.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Provider key this client answers for
    fn provider_key(&self) -> &'static str;

    /// Issue one invocation and return the raw structured payload
    async fn invoke_raw(
        &self,
        shape: &OutputShape,
        prompt: &NeutralPrompt,
        retry: bool,
    ) -> Option<Value>;
}

/// Invoke a client and decode the payload into a typed result
///
/// Stamps `source` with the client's provider key on success. A payload that
/// does not match the requested shape logs and yields `None`, same as any
/// other per-provider failure.
pub async fn invoke<T: StructuredOutput>(
    client: &dyn AiClient,
    prompt: &NeutralPrompt,
) -> Option<T> {
    let shape = T::shape();
    let payload = client.invoke_raw(&shape, prompt, false).await?;

    match serde_json::from_value::<T>(payload) {
        Ok(mut result) => {
            result.set_source(client.provider_key());
            Some(result)
        }
        Err(e) => {
            error!(
                "{} returned a payload that does not match '{}': {}",
                client.provider_key(),
                shape.name,
                e
            );
            None
        }
    }
}
