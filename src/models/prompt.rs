//! Neutral prompt shared across providers

use serde::{Deserialize, Serialize};

/// Provider-neutral two-part prompt
///
/// Produced once per generation request and shared read-only by every
/// concurrently invoked client; each client encodes it into its own
/// provider's request shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeutralPrompt {
    pub system: String,
    pub user: String,
}
