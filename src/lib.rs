//! # TFT Insights
//!
//! Match-history analysis for Teamfight Tactics players.
//!
//! ## Architecture
//!
//! - **models**: Raw match shapes, normalized records and output rows
//! - **analysis**: Normalization and rate/placement rankings (pure, synchronous)
//! - **reference**: Unit → native-trait lookup
//! - **fetch**: Upstream match, account and dataset clients
//! - **history**: Sequential match-history collection
//! - **service**: Fetch → normalize → analyze orchestration
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod analysis;
pub mod api;
pub mod config;
pub mod fetch;
pub mod history;
pub mod models;
pub mod reference;
pub mod service;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "10s", "3m", "500ms").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(n) = s.strip_suffix("ms") {
        return n.trim().parse().ok().map(Duration::from_millis);
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}

/// Shorten a player id for log lines.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
