//! Riot API client: match ids, match details and account lookups.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::{FetchError, MatchSource};
use crate::config::RiotConfig;
use crate::models::RawMatch;
use crate::short_id;

const TOKEN_HEADER: &str = "X-Riot-Token";

#[derive(Debug, Deserialize)]
struct Account {
    puuid: String,
}

/// Map a non-success status to an error. `subject` names what was looked up.
pub fn classify_status(status: StatusCode, subject: &str, wait: Duration) -> Option<FetchError> {
    if status.is_success() {
        return None;
    }

    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Unauthorized,
        StatusCode::NOT_FOUND => FetchError::SubjectNotFound(subject.to_string()),
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited {
            retry_after_secs: wait.as_secs().max(1),
        },
        other => FetchError::Unavailable {
            status: other.as_u16(),
        },
    })
}

/// HTTP client for the regional Riot API host.
pub struct RiotClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    config: RiotConfig,
}

impl RiotClient {
    /// Build a client. A missing API key is reported per request, not here.
    pub fn new(config: &RiotConfig) -> Result<Self, FetchError> {
        let base = config.api_base_url();
        let base_url = Url::parse(&base).map_err(|_| FetchError::InvalidUrl(base.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base));
        }

        let client = Client::builder()
            .user_agent(concat!("tft-insights/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            config: config.clone(),
        })
    }

    /// Build a URL from path segments; each segment is percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, url: &Url, timeout: Duration) -> Result<Response, FetchError> {
        let key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;
        debug!("GET {}", url.path());

        let response = self
            .client
            .get(url.clone())
            .header(TOKEN_HEADER, key)
            .timeout(timeout)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl MatchSource for RiotClient {
    fn name(&self) -> &'static str {
        "riot"
    }

    async fn match_ids(&self, puuid: &str) -> Result<Vec<String>, FetchError> {
        let mut url = self.endpoint(&["tft", "match", "v1", "matches", "by-puuid", puuid, "ids"])?;
        url.query_pairs_mut()
            .append_pair("start", "0")
            .append_pair("count", &self.config.match_count.to_string());

        let timeout = Duration::from_secs(self.config.ids_timeout_seconds);
        let wait = self.config.ids_rate_limit_wait();

        info!("Requesting match ids for {}", short_id(puuid));
        let mut response = self.send(&url, timeout).await?;

        // The configured wait applies, not the upstream Retry-After
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate limited on match ids, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
            response = self.send(&url, timeout).await?;
        }

        if let Some(err) = classify_status(response.status(), puuid, wait) {
            return Err(err);
        }

        let ids: Vec<String> = response.json().await?;
        info!("Found {} match ids for {}", ids.len(), short_id(puuid));
        Ok(ids)
    }

    async fn match_detail(&self, match_id: &str) -> Result<RawMatch, FetchError> {
        let url = self.endpoint(&["tft", "match", "v1", "matches", match_id])?;
        let timeout = Duration::from_secs(self.config.detail_timeout_seconds);
        let attempts = self.config.detail_max_attempts.max(1);
        let rate_limit_wait = self.config.detail_rate_limit_wait();

        let mut last_error = FetchError::Timeout;
        for attempt in 1..=attempts {
            let response = match self.send(&url, timeout).await {
                Ok(response) => response,
                Err(FetchError::Timeout) => {
                    warn!("Timeout on match {} (attempt {}/{})", match_id, attempt, attempts);
                    last_error = FetchError::Timeout;
                    if attempt < attempts {
                        tokio::time::sleep(self.config.timeout_retry_wait()).await;
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("Rate limited on match {}, waiting {:?}", match_id, rate_limit_wait);
                last_error = FetchError::RateLimited {
                    retry_after_secs: rate_limit_wait.as_secs().max(1),
                };
                tokio::time::sleep(rate_limit_wait).await;
                continue;
            }

            if !status.is_success() {
                return Err(match classify_status(status, match_id, Duration::ZERO) {
                    Some(FetchError::Unauthorized) => FetchError::Unauthorized,
                    _ => FetchError::Unavailable {
                        status: status.as_u16(),
                    },
                });
            }

            let body = response.bytes().await?;
            return serde_json::from_slice::<RawMatch>(&body)
                .map_err(|e| FetchError::Malformed(format!("match {}: {}", match_id, e)));
        }

        Err(last_error)
    }

    async fn resolve_riot_id(&self, game_name: &str, tag_line: &str) -> Result<String, FetchError> {
        let url = self.endpoint(&["riot", "account", "v1", "accounts", "by-riot-id", game_name, tag_line])?;
        let timeout = Duration::from_secs(self.config.ids_timeout_seconds);
        let riot_id = format!("{}#{}", game_name, tag_line);

        info!("Resolving {}", riot_id);
        let response = self.send(&url, timeout).await?;
        if let Some(err) = classify_status(response.status(), &riot_id, self.config.ids_rate_limit_wait()) {
            return Err(err);
        }

        let account: Account = response.json().await?;
        Ok(account.puuid)
    }
}
