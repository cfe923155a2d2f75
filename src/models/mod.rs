//! Data model module
//!
//! Neutral prompt and structured result shapes

pub mod creatives;
pub mod prompt;

pub use creatives::{AdCreative, AdCreatives};
pub use prompt::NeutralPrompt;
