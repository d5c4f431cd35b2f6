//! Sequential match-history collection.
//!
//! Match ids are fetched first, then each match detail in order with a pause
//! after every batch. A match that cannot be fetched is logged and skipped;
//! only the id lookup can fail the collection.

use std::time::Duration;

use tracing::{info, warn};

use crate::config::RiotConfig;
use crate::fetch::{FetchError, MatchSource};
use crate::models::RawMatch;
use crate::short_id;

/// Pacing for detail requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Pause after this many details; 0 disables pausing
    pub pause_every: usize,
    pub pause: Duration,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            pause_every: 10,
            pause: Duration::from_secs(3),
        }
    }
}

impl From<&RiotConfig> for HistoryOptions {
    fn from(config: &RiotConfig) -> Self {
        Self {
            pause_every: config.pause_every,
            pause: config.pause(),
        }
    }
}

/// Raw matches gathered for one player.
#[derive(Debug, Clone, Default)]
pub struct MatchHistory {
    /// Ids returned by the lookup
    pub requested: usize,

    /// Successfully fetched matches, in id order
    pub matches: Vec<RawMatch>,

    /// Ids whose detail fetch failed
    pub failed: usize,
}

/// Fetch the player's recent match ids, then every match detail.
pub async fn collect_history(
    source: &dyn MatchSource,
    puuid: &str,
    options: &HistoryOptions,
) -> Result<MatchHistory, FetchError> {
    let ids = source.match_ids(puuid).await?;

    let mut history = MatchHistory {
        requested: ids.len(),
        ..MatchHistory::default()
    };

    for (i, match_id) in ids.iter().enumerate() {
        if i > 0 && options.pause_every > 0 && i % options.pause_every == 0 {
            info!("Fetched {}/{} matches, pausing {:?}", i, ids.len(), options.pause);
            tokio::time::sleep(options.pause).await;
        }

        match source.match_detail(match_id).await {
            Ok(raw) => history.matches.push(raw),
            Err(e) => {
                warn!("Skipping match {}: {}", match_id, e);
                history.failed += 1;
            }
        }
    }

    info!(
        "Collected {}/{} matches for {} from {}",
        history.matches.len(),
        history.requested,
        short_id(puuid),
        source.name()
    );

    Ok(history)
}
