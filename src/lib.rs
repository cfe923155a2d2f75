//! Multi-provider AI generation library
//!
//! Fans a generation request out to every AI provider configured for a
//! customer and service, and streams each provider's structured result as it
//! completes

pub mod cache;
pub mod clients;
pub mod config;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod resolver;
pub mod services;
pub mod utils;

// Re-export common types
pub use cache::{MemoryCache, ResultCache};
pub use clients::{AiClient, ClientRegistry};
pub use config::{ConfigStore, Settings};
pub use handlers::{create_router, AppState};
pub use models::{AdCreatives, NeutralPrompt};
pub use resolver::{ConfigResolver, ProviderServiceConfig, ResolveError, ResolvedProvider};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
