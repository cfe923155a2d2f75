//! Fan-out aggregator
//!
//! Launches one invocation per configured provider and yields each result as
//! it completes. The stream is finite: it ends once every launched invocation
//! has finished. Invocations that produce nothing are dropped silently so one
//! provider's failure never aborts its siblings.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use tracing::error;

use crate::clients::{invoke, AiClient, ClientRegistry, StructuredOutput};
use crate::models::NeutralPrompt;
use crate::resolver::ResolvedProvider;

/// Instantiate one client per valid resolved provider
///
/// Entries that failed validation are logged and skipped, as are providers
/// with no registered client. The returned clients are exactly the
/// invocations fan-out will launch.
pub fn launch_clients(
    registry: &ClientRegistry,
    resolved: HashMap<String, ResolvedProvider>,
) -> Vec<Box<dyn AiClient>> {
    let mut clients = Vec::new();
    for (provider, outcome) in resolved {
        match outcome {
            ResolvedProvider::Ready(config) => {
                if let Some(client) = registry.get(&provider, &config) {
                    clients.push(client);
                }
            }
            ResolvedProvider::Invalid(errors) => {
                error!("Skipping provider '{}': {}", provider, errors);
            }
        }
    }
    clients
}

/// Fan the prompt out to every client and stream results in completion order
///
/// All invocations run concurrently; the only state they share is the
/// read-only prompt. No ordering is promised between providers beyond
/// "yield as each completes".
pub fn fan_out<T: StructuredOutput>(
    clients: Vec<Box<dyn AiClient>>,
    prompt: Arc<NeutralPrompt>,
) -> impl Stream<Item = T> + Send + 'static {
    let invocations: FuturesUnordered<_> = clients
        .into_iter()
        .map(|client| {
            let prompt = Arc::clone(&prompt);
            async move { invoke::<T>(client.as_ref(), &prompt).await }
        })
        .collect();

    invocations.filter_map(|result| async move { result })
}
