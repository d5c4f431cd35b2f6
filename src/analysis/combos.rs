//! Item-combination expansion and mean-placement rankings.

use std::collections::HashMap;

use itertools::Itertools;

use crate::models::{round2, MAX_ITEMS_PER_UNIT};

/// Separator between item names in a combination key.
pub const COMBO_SEPARATOR: &str = "|";

/// Every non-empty sub-combination of a unit's items, as sorted keys.
///
/// `[A, B]` yields `A`, `B` and `A|B`. At most the first three items are
/// considered.
pub fn item_combinations(items: &[String]) -> Vec<String> {
    let mut sorted: Vec<&str> = items
        .iter()
        .take(MAX_ITEMS_PER_UNIT)
        .map(String::as_str)
        .collect();
    sorted.sort_unstable();

    (1..=sorted.len())
        .flat_map(|size| {
            sorted
                .iter()
                .combinations(size)
                .map(|combo| combo.into_iter().join(COMBO_SEPARATOR))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Mean placement and sample size for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSummary {
    pub key: String,
    pub avg_placement: f64,
    pub games: u32,
}

#[derive(Debug, Default, Clone, Copy)]
struct PlacementTally {
    sum: u32,
    count: u32,
}

/// Group `(key, placement)` rows and rank keys by mean placement, best first.
///
/// Keys seen fewer than `min_games` times are dropped. Equal means keep the
/// order in which keys were first seen. Means are rounded to two decimals.
pub fn rank_by_mean_placement<I>(rows: I, min_games: u32, top_n: usize) -> Vec<PlacementSummary>
where
    I: IntoIterator<Item = (String, u8)>,
{
    let mut order: Vec<String> = Vec::new();
    let mut tallies: HashMap<String, PlacementTally> = HashMap::new();

    for (key, placement) in rows {
        let tally = tallies.entry(key).or_insert_with_key(|key| {
            order.push(key.clone());
            PlacementTally::default()
        });
        tally.sum += u32::from(placement);
        tally.count += 1;
    }

    let mut ranked: Vec<(String, f64, u32)> = order
        .into_iter()
        .filter_map(|key| {
            let tally = tallies.get(&key).copied()?;
            (tally.count >= min_games.max(1))
                .then(|| (key, tally.sum as f64 / tally.count as f64, tally.count))
        })
        .collect();

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(top_n);

    ranked
        .into_iter()
        .map(|(key, mean, games)| PlacementSummary {
            key,
            avg_placement: round2(mean),
            games,
        })
        .collect()
}
