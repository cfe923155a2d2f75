//! Creatives generation pipeline
//!
//! Trial lookup -> prompt rendering -> config resolution -> provider fan-out.
//! Any failure before fan-out is fatal and surfaces as an error instead of a
//! stream; after fan-out starts, per-provider failures only shrink the
//! result count.

use std::sync::Arc;

use futures::stream::Stream;
use tracing::info;

use crate::clients::{ClientRegistry, TrialClient};
use crate::models::AdCreatives;
use crate::prompts;
use crate::resolver::ConfigResolver;
use crate::services::{fan_out, launch_clients};
use crate::utils::error::AppError;

/// Service name under which creatives provider configs are stored
pub const CREATIVES_SERVICE: &str = "creatives";

/// Generate ad creatives for a customer and trial
///
/// Returns a finite stream that yields each provider's batch as soon as that
/// provider completes.
pub async fn generate(
    resolver: &ConfigResolver,
    registry: &ClientRegistry,
    trials: &TrialClient,
    customer_id: &str,
    nct_id: &str,
) -> Result<impl Stream<Item = AdCreatives> + Send + 'static, AppError> {
    let trial = trials.desc_eligibility(nct_id).await?;

    let prompt = prompts::creatives_prompt(customer_id, &trial.brief_summary, &trial.eligibility)
        .map_err(|e| AppError::Prompt(e.to_string()))?;

    let resolved = resolver.resolve(customer_id, CREATIVES_SERVICE).await?;

    let clients = launch_clients(registry, resolved);
    info!(
        "Fanning out creatives generation for {}/{} to {} providers",
        customer_id,
        nct_id,
        clients.len()
    );

    Ok(fan_out::<AdCreatives>(clients, Arc::new(prompt)))
}
