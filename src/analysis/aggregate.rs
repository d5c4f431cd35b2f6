//! Top-4 / bottom-4 rate rankings over a pluggable dimension.

use std::collections::{HashMap, HashSet};

use super::AnalysisError;
use crate::models::{Dimension, DimensionRanking, DimensionStat, MatchParticipantRecord};

/// Yields the dimension values present in one match.
pub trait DimensionExtractor {
    /// Name used in error messages.
    fn name(&self) -> &str {
        "value"
    }

    fn extract(&self, record: &MatchParticipantRecord) -> Vec<String>;
}

impl DimensionExtractor for Dimension {
    fn name(&self) -> &str {
        match self {
            Dimension::Trait => "trait",
            Dimension::Item => "item",
            Dimension::Augment => "augment",
        }
    }

    fn extract(&self, record: &MatchParticipantRecord) -> Vec<String> {
        match self {
            Dimension::Trait => distinct(&record.traits),
            // One value per unit slot: the same item on two units counts twice.
            Dimension::Item => record.items.iter().flatten().cloned().collect(),
            Dimension::Augment => distinct(&record.augments),
        }
    }
}

impl<F> DimensionExtractor for F
where
    F: Fn(&MatchParticipantRecord) -> Vec<String>,
{
    fn extract(&self, record: &MatchParticipantRecord) -> Vec<String> {
        self(record)
    }
}

/// First occurrence of each value, in order.
fn distinct(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

/// Thresholds for one ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateParams {
    /// Records required before aggregating at all
    pub min_records: usize,

    /// Values must appear strictly more often than this
    pub min_appearances: u32,

    /// Rows kept in each ranking
    pub top_n: usize,
}

impl Default for AggregateParams {
    fn default() -> Self {
        Self {
            min_records: 3,
            min_appearances: 10,
            top_n: 10,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    top: u32,
    bottom: u32,
}

impl Tally {
    fn appearances(&self) -> u32 {
        self.top + self.bottom
    }
}

/// Rank dimension values by top-4 rate and by bottom-4 rate.
///
/// Returns `(top, bottom)`. Equal rates keep the order in which values were
/// first seen.
pub fn aggregate<E>(
    records: &[MatchParticipantRecord],
    extractor: &E,
    params: &AggregateParams,
) -> Result<(Vec<DimensionStat>, Vec<DimensionStat>), AnalysisError>
where
    E: DimensionExtractor + ?Sized,
{
    if records.len() < params.min_records {
        return Err(AnalysisError::TooFewMatches {
            found: records.len(),
            required: params.min_records,
        });
    }

    let mut order: Vec<String> = Vec::new();
    let mut tallies: HashMap<String, Tally> = HashMap::new();

    for record in records {
        let is_top = record.is_top_half();
        for value in extractor.extract(record) {
            let tally = tallies.entry(value).or_insert_with_key(|key| {
                order.push(key.clone());
                Tally::default()
            });
            if is_top {
                tally.top += 1;
            } else {
                tally.bottom += 1;
            }
        }
    }

    let stats: Vec<DimensionStat> = order
        .into_iter()
        .filter_map(|key| {
            let tally = tallies.get(&key).copied()?;
            (tally.appearances() > params.min_appearances)
                .then(|| DimensionStat::from_counts(key, tally.top, tally.bottom))
        })
        .collect();

    if stats.is_empty() {
        return Err(AnalysisError::NoQualifyingValues {
            dimension: extractor.name().to_string(),
            floor: params.min_appearances,
        });
    }

    let mut top = stats.clone();
    top.sort_by(|a, b| b.top_rate.total_cmp(&a.top_rate));
    top.truncate(params.top_n);

    let mut bottom = stats;
    bottom.sort_by(|a, b| b.bottom_rate.total_cmp(&a.bottom_rate));
    bottom.truncate(params.top_n);

    Ok((top, bottom))
}

/// Aggregate one of the built-in dimensions into a ranking.
pub fn rank_dimension(
    records: &[MatchParticipantRecord],
    dimension: Dimension,
    params: &AggregateParams,
) -> Result<DimensionRanking, AnalysisError> {
    let (top, bottom) = aggregate(records, &dimension, params)?;
    Ok(DimensionRanking {
        dimension,
        top,
        bottom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(placement: u8, traits: &[&str]) -> MatchParticipantRecord {
        MatchParticipantRecord {
            placement,
            level: Some(8),
            traits: traits.iter().map(|t| t.to_string()).collect(),
            units: vec![],
            items: vec![],
            augments: vec![],
        }
    }

    fn with_items(placement: u8, items: Vec<Vec<&str>>) -> MatchParticipantRecord {
        let mut r = record(placement, &[]);
        r.units = items.iter().map(|_| "TFT14_Unit".to_string()).collect();
        r.items = items
            .into_iter()
            .map(|slot| slot.into_iter().map(str::to_string).collect())
            .collect();
        r
    }

    fn params(min_appearances: u32, top_n: usize) -> AggregateParams {
        AggregateParams {
            min_records: 3,
            min_appearances,
            top_n,
        }
    }

    #[test]
    fn test_assassin_scenario() {
        let records: Vec<_> = [1, 2, 5, 6, 8]
            .into_iter()
            .map(|p| record(p, &["Assassin"]))
            .collect();

        let (top, bottom) = aggregate(&records, &Dimension::Trait, &params(3, 10)).unwrap();

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, "Assassin");
        assert!((top[0].top_rate - 0.4).abs() < 1e-9);
        assert!((top[0].bottom_rate - 0.6).abs() < 1e-9);
        assert_eq!(top[0].games_played, 5);
        assert_eq!(bottom, top);
    }

    #[test]
    fn test_single_first_place_appearance() {
        let records = vec![
            record(1, &["Rare"]),
            record(5, &[]),
            record(6, &[]),
        ];

        let (top, _) = aggregate(&records, &Dimension::Trait, &params(0, 10)).unwrap();

        assert_eq!(top[0].key, "Rare");
        assert_eq!(top[0].top_rate, 1.0);
        assert_eq!(top[0].bottom_rate, 0.0);
        assert_eq!(top[0].games_played, 1);
    }

    #[test]
    fn test_frequency_floor_is_strict() {
        // "Common" appears 4 times, "Edge" exactly 3 times.
        let records = vec![
            record(1, &["Common", "Edge"]),
            record(2, &["Common", "Edge"]),
            record(7, &["Common", "Edge"]),
            record(8, &["Common"]),
        ];

        let (top, bottom) = aggregate(&records, &Dimension::Trait, &params(3, 10)).unwrap();

        assert!(top.iter().all(|s| s.key != "Edge"));
        assert!(bottom.iter().all(|s| s.key != "Edge"));
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn test_no_values_over_floor() {
        let records = vec![record(1, &["A"]), record(2, &["B"]), record(3, &["C"])];

        let err = aggregate(&records, &Dimension::Trait, &params(5, 10)).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NoQualifyingValues {
                dimension: "trait".to_string(),
                floor: 5
            }
        );
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_too_few_records() {
        let records = vec![record(1, &["A"]), record(2, &["A"])];

        let err = aggregate(&records, &Dimension::Trait, &params(0, 10)).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::TooFewMatches {
                found: 2,
                required: 3
            }
        );
    }

    #[test]
    fn test_rankings_sorted_and_truncated() {
        let records = vec![
            record(1, &["Good", "Mid", "Bad"]),
            record(2, &["Good", "Mid", "Bad"]),
            record(5, &["Good", "Mid", "Bad"]),
            record(3, &["Good"]),
            record(8, &["Mid", "Bad"]),
            record(7, &["Bad"]),
        ];

        let (top, bottom) = aggregate(&records, &Dimension::Trait, &params(0, 2)).unwrap();

        let top_keys: Vec<_> = top.iter().map(|s| s.key.as_str()).collect();
        let bottom_keys: Vec<_> = bottom.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(top_keys, vec!["Good", "Mid"]);
        assert_eq!(bottom_keys, vec!["Bad", "Mid"]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let records = vec![
            record(1, &["Zed", "Ahri"]),
            record(2, &["Zed", "Ahri"]),
            record(8, &["Zed", "Ahri"]),
        ];

        let (top, bottom) = aggregate(&records, &Dimension::Trait, &params(0, 10)).unwrap();
        assert_eq!(top[0].key, "Zed");
        assert_eq!(top[1].key, "Ahri");
        assert_eq!(bottom[0].key, "Zed");
    }

    #[test]
    fn test_rates_always_sum_to_one() {
        let records: Vec<_> = (0..40u8)
            .map(|i| {
                let placement = i % 8 + 1;
                let traits: Vec<&str> = ["A", "B", "C", "D"]
                    .into_iter()
                    .enumerate()
                    .filter(|(j, _)| (i as usize + j) % 3 != 0)
                    .map(|(_, t)| t)
                    .collect();
                record(placement, &traits)
            })
            .collect();

        let (top, bottom) = aggregate(&records, &Dimension::Trait, &params(2, 10)).unwrap();
        for stat in top.iter().chain(bottom.iter()) {
            assert!((stat.top_rate + stat.bottom_rate - 1.0).abs() < 1e-9);
            assert!(stat.games_played > 2);
        }
    }

    #[test]
    fn test_trait_duplicates_counted_once_per_match() {
        let records = vec![
            record(1, &["Dup", "Dup"]),
            record(2, &["Dup"]),
            record(6, &["Dup"]),
        ];

        let (top, _) = aggregate(&records, &Dimension::Trait, &params(0, 10)).unwrap();
        assert_eq!(top[0].games_played, 3);
    }

    #[test]
    fn test_items_counted_per_unit_slot() {
        let records = vec![
            with_items(1, vec![vec!["Blade", "Bow"], vec!["Blade"]]),
            with_items(6, vec![vec!["Blade"]]),
            with_items(3, vec![vec![], vec!["Bow"]]),
        ];

        let (top, _) = aggregate(&records, &Dimension::Item, &params(0, 10)).unwrap();
        let blade = top.iter().find(|s| s.key == "Blade").unwrap();
        let bow = top.iter().find(|s| s.key == "Bow").unwrap();

        assert_eq!(blade.games_played, 3);
        assert!((blade.top_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(bow.games_played, 2);
        assert_eq!(bow.top_rate, 1.0);
    }

    #[test]
    fn test_closure_extractor() {
        let records = vec![record(1, &[]), record(2, &[]), record(7, &[])];
        let by_level = |r: &MatchParticipantRecord| -> Vec<String> {
            r.level.map(|l| vec![format!("level-{}", l)]).unwrap_or_default()
        };

        let (top, _) = aggregate(&records, &by_level, &params(0, 10)).unwrap();
        assert_eq!(top[0].key, "level-8");
        assert_eq!(top[0].games_played, 3);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        use crate::analysis::normalize;
        use crate::models::RawMatch;
        use serde_json::json;

        let raw = |id: &str, placement: u8, traits: &[&str], items: &[&str]| -> RawMatch {
            let traits: Vec<_> = traits.iter().map(|t| json!({"name": t, "tier_current": 1})).collect();
            serde_json::from_value(json!({
                "metadata": {"match_id": id, "participants": ["other", "me"]},
                "info": {
                    "tft_set_number": 14,
                    "participants": [
                        {"placement": 9 - placement},
                        {
                            "placement": placement,
                            "traits": traits,
                            "units": [{"character_id": "TFT14_Jinx", "itemNames": items}],
                            "augments": ["Augment_Pandora"]
                        }
                    ]
                }
            }))
            .unwrap()
        };

        let matches = vec![
            raw("NA1_1", 1, &["A", "B", "C"], &["Bow", "Sword"]),
            raw("NA1_2", 4, &["B", "C"], &["Bow"]),
            raw("NA1_3", 5, &["A", "C"], &["Sword"]),
            raw("NA1_4", 8, &["A", "B"], &["Bow", "Bow"]),
        ];

        let run = || {
            let batch = normalize(&matches, "me", 14);
            [Dimension::Trait, Dimension::Item, Dimension::Augment]
                .map(|dimension| rank_dimension(&batch.records, dimension, &params(0, 10)).unwrap())
        };

        let first = run();
        let second = run();
        assert_eq!(first, second);
        assert_eq!(first[0].top.len(), 3);
    }
}
