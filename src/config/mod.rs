//! Configuration management module
//!
//! Environment-driven server settings and the static customer/provider
//! configuration store

pub mod settings;
pub mod store;

pub use settings::Settings;
pub use store::ConfigStore;
