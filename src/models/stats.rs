//! Derived statistics models.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// The attribute a rate ranking is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Trait,
    Item,
    Augment,
}

impl Dimension {
    /// Column label used for the key in response rows.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Trait => "Trait",
            Dimension::Item => "Item",
            Dimension::Augment => "Augment",
        }
    }

    /// Plural form used in response field names (`top_traits`, ...).
    pub fn plural(&self) -> &'static str {
        match self {
            Dimension::Trait => "traits",
            Dimension::Item => "items",
            Dimension::Augment => "augments",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Trait => write!(f, "trait"),
            Dimension::Item => write!(f, "item"),
            Dimension::Augment => write!(f, "augment"),
        }
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trait" | "traits" => Ok(Dimension::Trait),
            "item" | "items" => Ok(Dimension::Item),
            "augment" | "augments" => Ok(Dimension::Augment),
            other => Err(format!("unknown dimension: {}", other)),
        }
    }
}

/// Top-4 / bottom-4 split for one dimension value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionStat {
    pub key: String,

    /// Share of appearances finishing 1st-4th (0.0 to 1.0)
    pub top_rate: f64,

    /// Share of appearances finishing 5th-8th (0.0 to 1.0)
    pub bottom_rate: f64,

    /// Appearances of `key`, not matches overall
    pub games_played: u32,
}

impl DimensionStat {
    /// Build a row from top and bottom appearance counts.
    pub fn from_counts(key: String, top: u32, bottom: u32) -> Self {
        let games_played = top + bottom;
        let (top_rate, bottom_rate) = if games_played > 0 {
            (
                top as f64 / games_played as f64,
                bottom as f64 / games_played as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            key,
            top_rate,
            bottom_rate,
            games_played,
        }
    }

    /// Wrap this row for serialization under a dimension label.
    pub fn labeled(&self, dimension: Dimension) -> LabeledStat<'_> {
        LabeledStat {
            dimension,
            stat: self,
        }
    }
}

/// A `DimensionStat` rendered as
/// `{"<Label>": key, "Top 4 Rate": .., "Bottom 4 Rate": .., "Games Played": ..}`.
#[derive(Debug, Clone, Copy)]
pub struct LabeledStat<'a> {
    dimension: Dimension,
    stat: &'a DimensionStat,
}

impl Serialize for LabeledStat<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(self.dimension.label(), &self.stat.key)?;
        map.serialize_entry("Top 4 Rate", &self.stat.top_rate)?;
        map.serialize_entry("Bottom 4 Rate", &self.stat.bottom_rate)?;
        map.serialize_entry("Games Played", &self.stat.games_played)?;
        map.end()
    }
}

/// Best and worst performers for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRanking {
    pub dimension: Dimension,

    /// Sorted by `top_rate` descending
    pub top: Vec<DimensionStat>,

    /// Sorted by `bottom_rate` descending
    pub bottom: Vec<DimensionStat>,
}

/// Mean placement of an item combination on one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboStat {
    /// Sorted item names joined with `|`
    pub items: String,
    pub avg_placement: f64,
    pub games: u32,
}

/// Mean placement of a non-native trait fielded alongside one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyTraitStat {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub avg_placement: f64,
    pub games: u32,
}

/// Item and trait performance for a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPerformanceReport {
    pub unit_name: String,

    /// Unit slots fielded across the analyzed matches
    pub games_analyzed: u32,

    pub item_combinations: Vec<ComboStat>,
    pub synergy_traits: Vec<SynergyTraitStat>,
    pub native_traits: Vec<String>,

    /// Raw appearance count, set in the multi-unit summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_games: Option<u32>,
}

/// Most-played units with their reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitsSummary {
    pub total_games_analyzed: u32,
    pub total_unit_instances: u32,
    pub top_units: Vec<UnitPerformanceReport>,
}

/// Round a mean placement for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
