pub mod analyze;
pub mod health;
pub mod units;

use serde::Deserialize;

use super::ApiError;

/// Query for endpoints addressed by player id.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerQuery {
    pub puuid: Option<String>,

    /// Only read by the unit endpoints
    pub unit: Option<String>,
}

/// Query for endpoints addressed by `gameName#tagLine`.
#[derive(Debug, Default, Deserialize)]
pub struct RiotIdQuery {
    #[serde(rename = "gameName")]
    pub game_name: Option<String>,

    #[serde(rename = "tagLine")]
    pub tag_line: Option<String>,

    pub unit: Option<String>,
}

/// A present, non-blank query value.
pub(crate) fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} parameter is required", name)))
}
