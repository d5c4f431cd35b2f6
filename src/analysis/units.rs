//! Per-unit item-combination and synergy-trait reports.

use std::collections::HashMap;

use tracing::debug;

use super::combos::{item_combinations, rank_by_mean_placement};
use super::AnalysisError;
use crate::models::{
    ComboStat, MatchParticipantRecord, SynergyTraitStat, UnitPerformanceReport, UnitsSummary,
    MAX_ITEMS_PER_UNIT,
};
use crate::reference::NativeTraitIndex;

/// One fielded unit in one match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitRow<'a> {
    pub unit: &'a str,

    /// At most three items
    pub items: &'a [String],

    pub placement: u8,

    /// Every active trait on the board that match
    pub traits: &'a [String],
}

/// Explode records into one row per fielded unit.
pub fn unit_rows(records: &[MatchParticipantRecord]) -> Vec<UnitRow<'_>> {
    records
        .iter()
        .flat_map(|record| {
            record.unit_slots().map(move |(unit, items)| UnitRow {
                unit,
                items: &items[..items.len().min(MAX_ITEMS_PER_UNIT)],
                placement: record.placement,
                traits: &record.traits,
            })
        })
        .collect()
}

/// Thresholds for a single-unit report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitAnalysisParams {
    /// Rows kept in each ranking
    pub top_n: usize,

    /// Unit appearances required for a report
    pub min_games: usize,

    /// Appearances required for an item combination to be reported
    pub min_combo_games: u32,

    /// Trait names are stripped of `TFT{set_version}_`
    pub set_version: u32,
}

impl Default for UnitAnalysisParams {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_games: 3,
            min_combo_games: 3,
            set_version: 14,
        }
    }
}

impl UnitAnalysisParams {
    fn trait_prefix(&self) -> String {
        format!("TFT{}_", self.set_version)
    }
}

/// Thresholds for the most-played-units summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSummaryParams {
    /// Most frequent units considered
    pub max_units: usize,

    /// Appearances a unit needs to be considered
    pub min_instances: usize,

    /// Applied to each unit's report
    pub report: UnitAnalysisParams,
}

impl Default for UnitSummaryParams {
    fn default() -> Self {
        Self {
            max_units: 10,
            min_instances: 3,
            report: UnitAnalysisParams {
                top_n: 5,
                min_games: 2,
                ..UnitAnalysisParams::default()
            },
        }
    }
}

/// Report for one unit from already-exploded rows.
pub fn analyze_unit(
    rows: &[UnitRow<'_>],
    unit: &str,
    natives: &NativeTraitIndex,
    params: &UnitAnalysisParams,
) -> Result<UnitPerformanceReport, AnalysisError> {
    let matching: Vec<&UnitRow<'_>> = rows.iter().filter(|r| r.unit == unit).collect();
    debug!("Analyzing {} across {} games", unit, matching.len());

    if matching.len() < params.min_games {
        return Err(AnalysisError::InsufficientGames {
            unit: unit.to_string(),
            found: matching.len(),
            required: params.min_games,
        });
    }

    let combo_rows = matching.iter().flat_map(|row| {
        item_combinations(row.items)
            .into_iter()
            .map(move |key| (key, row.placement))
    });
    let combos = rank_by_mean_placement(combo_rows, params.min_combo_games, params.top_n)
        .into_iter()
        .map(|s| ComboStat {
            items: s.key,
            avg_placement: s.avg_placement,
            games: s.games,
        })
        .collect();

    let native_traits = natives.native_traits(unit);
    let prefix = params.trait_prefix();
    let trait_rows = matching.iter().flat_map(|row| {
        row.traits
            .iter()
            .map(|name| name.strip_prefix(prefix.as_str()).unwrap_or(name))
            .filter(|name| !native_traits.iter().any(|native| native == name))
            .map(move |name| (name.to_string(), row.placement))
            .collect::<Vec<_>>()
    });
    let synergy_traits = rank_by_mean_placement(trait_rows, 1, params.top_n)
        .into_iter()
        .map(|s| SynergyTraitStat {
            trait_name: s.key,
            avg_placement: s.avg_placement,
            games: s.games,
        })
        .collect();

    Ok(UnitPerformanceReport {
        unit_name: unit.to_string(),
        games_analyzed: matching.len() as u32,
        item_combinations: combos,
        synergy_traits,
        native_traits: native_traits.to_vec(),
        total_games: None,
    })
}

/// Report for one requested unit.
pub fn unit_report(
    records: &[MatchParticipantRecord],
    unit: &str,
    natives: &NativeTraitIndex,
    params: &UnitAnalysisParams,
) -> Result<UnitPerformanceReport, AnalysisError> {
    let rows = unit_rows(records);
    if !rows.iter().any(|r| r.unit == unit) {
        return Err(AnalysisError::UnitNotFound(unit.to_string()));
    }
    analyze_unit(&rows, unit, natives, params)
}

/// Reports for the most frequently fielded units.
pub fn summarize_units(
    records: &[MatchParticipantRecord],
    natives: &NativeTraitIndex,
    params: &UnitSummaryParams,
) -> UnitsSummary {
    let rows = unit_rows(records);

    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in &rows {
        let count = counts.entry(row.unit).or_insert_with(|| {
            order.push(row.unit);
            0
        });
        *count += 1;
    }

    let mut ranked: Vec<(&str, usize)> = order.into_iter().map(|u| (u, counts[u])).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(params.max_units);

    let top_units = ranked
        .into_iter()
        .filter(|(_, count)| *count >= params.min_instances)
        .filter_map(|(unit, count)| match analyze_unit(&rows, unit, natives, &params.report) {
            Ok(mut report) => {
                report.total_games = Some(count as u32);
                Some(report)
            }
            Err(e) => {
                debug!("Skipping {}: {}", unit, e);
                None
            }
        })
        .collect();

    UnitsSummary {
        total_games_analyzed: records.len() as u32,
        total_unit_instances: rows.len() as u32,
        top_units,
    }
}
