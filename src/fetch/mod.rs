//! Upstream collaborators.
//!
//! Match history and account lookups come from the Riot API; the unit →
//! native-trait dataset comes from CommunityDragon. Both sit behind traits so
//! the pipeline and the HTTP layer can be exercised without the network.

mod dataset;
mod riot;

pub use dataset::CommunityDragonClient;
pub use riot::{classify_status, RiotClient};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RawMatch;
use crate::reference::NativeTraitIndex;

/// Errors that can occur while talking to upstream services.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Invalid API key - check RIOT_API_KEY")]
    Unauthorized,

    #[error("Player not found: {0}")]
    SubjectNotFound(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned HTTP {status}")]
    Unavailable { status: u16 },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("RIOT_API_KEY is not configured")]
    MissingApiKey,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Source of match history and account lookups.
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Most recent match ids for a player, newest first.
    async fn match_ids(&self, puuid: &str) -> Result<Vec<String>, FetchError>;

    /// Full record of one match.
    async fn match_detail(&self, match_id: &str) -> Result<RawMatch, FetchError>;

    /// Resolve `gameName#tagLine` to a player id.
    async fn resolve_riot_id(&self, game_name: &str, tag_line: &str) -> Result<String, FetchError>;
}

/// Source of the unit → native-trait index.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn load(&self) -> Result<NativeTraitIndex, FetchError>;
}

/// A fixed index, for offline runs and tests.
#[async_trait]
impl ReferenceSource for NativeTraitIndex {
    async fn load(&self) -> Result<NativeTraitIndex, FetchError> {
        Ok(self.clone())
    }
}


/// Local HTTP server standing in for the upstream hosts.
#[cfg(test)]
pub mod stub {
    use axum::Router;
    use tokio::net::TcpListener;

    /// Serve `app` on an ephemeral port and return its base URL.
    pub async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
