//! Raw match shapes as returned by the upstream match-detail endpoint.
//!
//! Everything the normalizer reads is optional or defaulted here: a match
//! with a surprising shape is dropped later, it never fails deserialization
//! for a field the analysis does not need.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A full match record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMatch {
    #[serde(default)]
    pub metadata: RawMetadata,

    pub info: RawInfo,
}

/// Match metadata. `participants` lists player ids in the same order as
/// `info.participants`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub match_id: Option<String>,

    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInfo {
    /// Competition-set version the match was played on
    #[serde(default)]
    pub tft_set_number: Option<u32>,

    /// Epoch milliseconds
    #[serde(default)]
    pub game_datetime: Option<i64>,

    pub participants: Vec<RawParticipant>,
}

/// One player's end-of-match board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawParticipant {
    /// Present inline on newer payloads
    #[serde(default)]
    pub puuid: Option<String>,

    /// Kept untyped so a malformed value drops the match instead of the batch
    #[serde(default)]
    pub placement: Option<Value>,

    #[serde(default)]
    pub level: Option<u32>,

    #[serde(default)]
    pub traits: Vec<RawTrait>,

    #[serde(default)]
    pub units: Vec<RawUnit>,

    #[serde(default)]
    pub augments: Vec<String>,
}

impl RawParticipant {
    /// Placement as an integer in 1..=8, if present and integral.
    pub fn integral_placement(&self) -> Option<u8> {
        let value = self.placement.as_ref()?;
        let placement = match value.as_u64() {
            Some(p) => p,
            None => {
                let f = value.as_f64()?;
                if f.fract() != 0.0 || f < 0.0 {
                    return None;
                }
                f as u64
            }
        };

        if (1..=8).contains(&placement) {
            Some(placement as u8)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTrait {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub num_units: Option<u32>,

    /// 0 means the trait is present on the board but not active
    #[serde(default)]
    pub tier_current: Option<u32>,
}

impl RawTrait {
    pub fn is_active(&self) -> bool {
        self.tier_current.map_or(true, |tier| tier > 0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUnit {
    #[serde(default)]
    pub character_id: String,

    #[serde(default, rename = "itemNames")]
    pub item_names: Vec<String>,

    #[serde(default)]
    pub tier: Option<u32>,
}
