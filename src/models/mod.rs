//! Core data models for match analysis.

mod raw;
mod record;
mod stats;

pub use raw::*;
pub use record::*;
pub use stats::*;
