//! Utility module
//!
//! Shared error types and helpers

pub mod error;
