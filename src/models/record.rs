//! Normalized per-match record for the subject player.

use serde::{Deserialize, Serialize};

/// Items a single unit slot can carry.
pub const MAX_ITEMS_PER_UNIT: usize = 3;

/// Placements up to and including this one are a top-4 finish.
pub const TOP_HALF_CUTOFF: u8 = 4;

/// The subject player's board in one match, after normalization.
///
/// `units` and `items` are parallel: `items[i]` holds the items on `units[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchParticipantRecord {
    /// Final placement (1 = winner, 8 = first out)
    pub placement: u8,

    /// Player level at elimination or victory
    pub level: Option<u32>,

    /// Active trait names
    pub traits: Vec<String>,

    /// Unit character ids
    pub units: Vec<String>,

    /// Item names per unit slot
    pub items: Vec<Vec<String>>,

    /// Augment ids
    pub augments: Vec<String>,
}

impl MatchParticipantRecord {
    /// Whether this match finished in the top half of the lobby.
    pub fn is_top_half(&self) -> bool {
        self.placement <= TOP_HALF_CUTOFF
    }

    /// Iterate unit slots as `(unit, items)` pairs.
    pub fn unit_slots(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.units
            .iter()
            .zip(self.items.iter())
            .map(|(unit, items)| (unit.as_str(), items.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(placement: u8) -> MatchParticipantRecord {
        MatchParticipantRecord {
            placement,
            level: Some(8),
            traits: vec![],
            units: vec!["TFT14_Jinx".to_string(), "TFT14_Vi".to_string()],
            items: vec![vec!["TFT_Item_GuinsoosRageblade".to_string()], vec![]],
            augments: vec![],
        }
    }

    #[test]
    fn test_top_half_boundary() {
        assert!(record(1).is_top_half());
        assert!(record(4).is_top_half());
        assert!(!record(5).is_top_half());
        assert!(!record(8).is_top_half());
    }

    #[test]
    fn test_unit_slots_pairs_units_with_items() {
        let r = record(2);
        let slots: Vec<_> = r.unit_slots().collect();

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].0, "TFT14_Jinx");
        assert_eq!(slots[0].1.len(), 1);
        assert!(slots[1].1.is_empty());
    }
}
