//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::{AggregateParams, UnitAnalysisParams, UnitSummaryParams};
use crate::models::Dimension;
use crate::parse_duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Riot API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiotConfig {
    /// Usually supplied through `RIOT_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Regional routing value ("americas", "europe", "asia", "sea")
    #[serde(default = "default_region")]
    pub region: String,

    /// Overrides the regional host, e.g. for a proxy
    #[serde(default)]
    pub base_url: Option<String>,

    /// Match ids requested per analysis
    #[serde(default = "default_match_count")]
    pub match_count: u32,

    #[serde(default = "default_ids_timeout")]
    pub ids_timeout_seconds: u64,

    #[serde(default = "default_detail_timeout")]
    pub detail_timeout_seconds: u64,

    /// Wait before the single retry of a rate-limited id lookup
    #[serde(default = "default_ids_rate_limit_wait")]
    pub ids_rate_limit_wait: String,

    /// Wait before retrying a rate-limited match detail
    #[serde(default = "default_detail_rate_limit_wait")]
    pub detail_rate_limit_wait: String,

    #[serde(default = "default_timeout_retry_wait")]
    pub timeout_retry_wait: String,

    #[serde(default = "default_detail_max_attempts")]
    pub detail_max_attempts: u32,

    /// Pause after this many match details
    #[serde(default = "default_pause_every")]
    pub pause_every: usize,

    #[serde(default = "default_pause")]
    pub pause: String,
}

fn default_region() -> String {
    "americas".to_string()
}

fn default_match_count() -> u32 {
    50
}

fn default_ids_timeout() -> u64 {
    15
}

fn default_detail_timeout() -> u64 {
    20
}

fn default_ids_rate_limit_wait() -> String {
    "15s".to_string()
}

fn default_detail_rate_limit_wait() -> String {
    "10s".to_string()
}

fn default_timeout_retry_wait() -> String {
    "3s".to_string()
}

fn default_detail_max_attempts() -> u32 {
    2
}

fn default_pause_every() -> usize {
    10
}

fn default_pause() -> String {
    "3s".to_string()
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            region: default_region(),
            base_url: None,
            match_count: default_match_count(),
            ids_timeout_seconds: default_ids_timeout(),
            detail_timeout_seconds: default_detail_timeout(),
            ids_rate_limit_wait: default_ids_rate_limit_wait(),
            detail_rate_limit_wait: default_detail_rate_limit_wait(),
            timeout_retry_wait: default_timeout_retry_wait(),
            detail_max_attempts: default_detail_max_attempts(),
            pause_every: default_pause_every(),
            pause: default_pause(),
        }
    }
}

impl RiotConfig {
    /// Host serving match and account lookups for the configured region.
    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}.api.riotgames.com", self.region),
        }
    }

    pub fn ids_rate_limit_wait(&self) -> Duration {
        parse_duration(&self.ids_rate_limit_wait).unwrap_or(Duration::from_secs(15))
    }

    pub fn detail_rate_limit_wait(&self) -> Duration {
        parse_duration(&self.detail_rate_limit_wait).unwrap_or(Duration::from_secs(10))
    }

    pub fn timeout_retry_wait(&self) -> Duration {
        parse_duration(&self.timeout_retry_wait).unwrap_or(Duration::from_secs(3))
    }

    pub fn pause(&self) -> Duration {
        parse_duration(&self.pause).unwrap_or(Duration::from_secs(3))
    }
}

/// Static game dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_dataset_url")]
    pub dataset_url: String,

    #[serde(default = "default_reference_timeout")]
    pub timeout_seconds: u64,
}

fn default_dataset_url() -> String {
    "https://raw.communitydragon.org/latest/cdragon/tft/en_us.json".to_string()
}

fn default_reference_timeout() -> u64 {
    10
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            dataset_url: default_dataset_url(),
            timeout_seconds: default_reference_timeout(),
        }
    }
}

/// Per-dimension appearance floors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinAppearances {
    #[serde(default = "default_trait_floor")]
    pub traits: u32,

    #[serde(default = "default_item_floor")]
    pub items: u32,

    #[serde(default = "default_augment_floor")]
    pub augments: u32,
}

fn default_trait_floor() -> u32 {
    10
}

fn default_item_floor() -> u32 {
    10
}

fn default_augment_floor() -> u32 {
    1
}

impl Default for MinAppearances {
    fn default() -> Self {
        Self {
            traits: default_trait_floor(),
            items: default_item_floor(),
            augments: default_augment_floor(),
        }
    }
}

/// Analysis thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Only matches from this set are analyzed
    #[serde(default = "default_set_version")]
    pub set_version: u32,

    #[serde(default = "default_min_records")]
    pub min_records: usize,

    #[serde(default)]
    pub min_appearances: MinAppearances,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_top_n")]
    pub unit_top_n: usize,

    #[serde(default = "default_unit_min_games")]
    pub unit_min_games: usize,

    #[serde(default = "default_min_combo_games")]
    pub min_combo_games: u32,

    #[serde(default = "default_summary_top_n")]
    pub summary_top_n: usize,

    #[serde(default = "default_summary_min_games")]
    pub summary_min_games: usize,

    #[serde(default = "default_summary_units")]
    pub summary_units: usize,

    #[serde(default = "default_summary_min_instances")]
    pub summary_min_instances: usize,
}

fn default_set_version() -> u32 {
    14
}

fn default_min_records() -> usize {
    3
}

fn default_top_n() -> usize {
    10
}

fn default_unit_min_games() -> usize {
    3
}

fn default_min_combo_games() -> u32 {
    3
}

fn default_summary_top_n() -> usize {
    5
}

fn default_summary_min_games() -> usize {
    2
}

fn default_summary_units() -> usize {
    10
}

fn default_summary_min_instances() -> usize {
    3
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            set_version: default_set_version(),
            min_records: default_min_records(),
            min_appearances: MinAppearances::default(),
            top_n: default_top_n(),
            unit_top_n: default_top_n(),
            unit_min_games: default_unit_min_games(),
            min_combo_games: default_min_combo_games(),
            summary_top_n: default_summary_top_n(),
            summary_min_games: default_summary_min_games(),
            summary_units: default_summary_units(),
            summary_min_instances: default_summary_min_instances(),
        }
    }
}

impl AnalysisConfig {
    pub fn aggregate_params(&self, dimension: Dimension) -> AggregateParams {
        let min_appearances = match dimension {
            Dimension::Trait => self.min_appearances.traits,
            Dimension::Item => self.min_appearances.items,
            Dimension::Augment => self.min_appearances.augments,
        };

        AggregateParams {
            min_records: self.min_records,
            min_appearances,
            top_n: self.top_n,
        }
    }

    pub fn unit_params(&self) -> UnitAnalysisParams {
        UnitAnalysisParams {
            top_n: self.unit_top_n,
            min_games: self.unit_min_games,
            min_combo_games: self.min_combo_games,
            set_version: self.set_version,
        }
    }

    pub fn summary_params(&self) -> UnitSummaryParams {
        UnitSummaryParams {
            max_units: self.summary_units,
            min_instances: self.summary_min_instances,
            report: UnitAnalysisParams {
                top_n: self.summary_top_n,
                min_games: self.summary_min_games,
                ..self.unit_params()
            },
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub riot: RiotConfig,

    #[serde(default)]
    pub reference: ReferenceConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, apply environment overrides, validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            info!("Loading config from {}", path.display());
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            AppConfig::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `RIOT_API_KEY`, `TFT_SET` and `PORT` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("RIOT_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.riot.api_key = Some(key.trim().to_string());
        }

        if let Some(set) = lookup("TFT_SET") {
            self.analysis.set_version = set.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("TFT_SET must be a number, got '{}'", set))
            })?;
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got '{}'", port))
            })?;
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.analysis.top_n == 0 || self.analysis.unit_top_n == 0 || self.analysis.summary_top_n == 0 {
            return Err(ConfigError::ValidationError(
                "Ranking sizes must be greater than 0".to_string(),
            ));
        }

        if self.riot.match_count == 0 {
            return Err(ConfigError::ValidationError(
                "Match count must be greater than 0".to_string(),
            ));
        }

        if self.riot.detail_max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "Match detail attempts must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("ids_rate_limit_wait", &self.riot.ids_rate_limit_wait),
            ("detail_rate_limit_wait", &self.riot.detail_rate_limit_wait),
            ("timeout_retry_wait", &self.riot.timeout_retry_wait),
            ("pause", &self.riot.pause),
        ] {
            if parse_duration(value).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "riot.{} is not a duration: '{}'",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
