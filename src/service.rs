//! Fetch → normalize → analyze pipeline shared by the HTTP API and the CLI.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::{normalize, rank_dimension, summarize_units, unit_report, AnalysisError};
use crate::config::AnalysisConfig;
use crate::fetch::{FetchError, MatchSource, ReferenceSource};
use crate::history::{collect_history, HistoryOptions};
use crate::models::{Dimension, DimensionRanking, MatchParticipantRecord, UnitPerformanceReport, UnitsSummary};
use crate::reference::NativeTraitIndex;
use crate::short_id;

/// Errors that can end an analysis request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Output of a unit analysis: one unit, or the most-played ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UnitAnalysis {
    Single(UnitPerformanceReport),
    Summary(UnitsSummary),
}

/// Runs analyses against a match source.
pub struct Analyzer {
    source: Arc<dyn MatchSource>,
    reference: Arc<dyn ReferenceSource>,
    config: AnalysisConfig,
    history: HistoryOptions,
}

impl Analyzer {
    pub fn new(
        source: Arc<dyn MatchSource>,
        reference: Arc<dyn ReferenceSource>,
        config: AnalysisConfig,
        history: HistoryOptions,
    ) -> Self {
        Self {
            source,
            reference,
            config,
            history,
        }
    }

    /// Set version being analyzed.
    pub fn set_version(&self) -> u32 {
        self.config.set_version
    }

    /// Resolve `gameName#tagLine` to a player id.
    pub async fn resolve(&self, game_name: &str, tag_line: &str) -> Result<String, ServiceError> {
        Ok(self.source.resolve_riot_id(game_name, tag_line).await?)
    }

    /// Collect and normalize the player's recent matches on the configured set.
    pub async fn load_records(&self, puuid: &str) -> Result<Vec<MatchParticipantRecord>, ServiceError> {
        let history = collect_history(self.source.as_ref(), puuid, &self.history).await?;
        if history.requested == 0 {
            return Err(AnalysisError::TooFewMatches {
                found: 0,
                required: self.config.min_records,
            }
            .into());
        }

        let batch = normalize(&history.matches, puuid, self.config.set_version);
        info!(
            "{}: {} valid matches, {} from Set {}, {} dropped",
            short_id(puuid),
            batch.valid_matches(),
            batch.records.len(),
            self.config.set_version,
            batch.dropped + history.failed
        );

        batch.require(self.config.min_records, self.config.set_version)?;
        Ok(batch.records)
    }

    /// Top-4 / bottom-4 rankings for one dimension.
    pub async fn rank(&self, puuid: &str, dimension: Dimension) -> Result<DimensionRanking, ServiceError> {
        let records = self.load_records(puuid).await?;
        let ranking = rank_dimension(&records, dimension, &self.config.aggregate_params(dimension))?;

        info!(
            "Ranked {} {} for {}",
            ranking.top.len(),
            dimension.plural(),
            short_id(puuid)
        );
        Ok(ranking)
    }

    /// Report for `unit`, or a summary of the most-played units.
    pub async fn units(&self, puuid: &str, unit: Option<&str>) -> Result<UnitAnalysis, ServiceError> {
        let records = self.load_records(puuid).await?;
        let natives = self.native_traits().await;

        match unit {
            Some(unit) => {
                let report = unit_report(&records, unit, &natives, &self.config.unit_params())?;
                Ok(UnitAnalysis::Single(report))
            }
            None => {
                let summary = summarize_units(&records, &natives, &self.config.summary_params());
                info!(
                    "Summarized {} units for {}",
                    summary.top_units.len(),
                    short_id(puuid)
                );
                Ok(UnitAnalysis::Summary(summary))
            }
        }
    }

    async fn native_traits(&self) -> NativeTraitIndex {
        match self.reference.load().await {
            Ok(index) => index,
            Err(e) => {
                warn!("Native trait data unavailable, continuing without it: {}", e);
                NativeTraitIndex::empty()
            }
        }
    }
}
