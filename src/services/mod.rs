//! Service layer module
//!
//! Fan-out aggregation and the creatives generation pipeline

pub mod creatives;
pub mod fanout;

pub use fanout::{fan_out, launch_clients};
