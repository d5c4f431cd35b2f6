//! Projection of raw matches onto the subject player's board.

use tracing::debug;

use super::AnalysisError;
use crate::models::{MatchParticipantRecord, RawMatch, RawParticipant, MAX_ITEMS_PER_UNIT};

/// Output of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    /// Records from the target set, in input order
    pub records: Vec<MatchParticipantRecord>,

    /// Valid matches played on another set
    pub other_set: usize,

    /// Matches skipped as malformed or missing the subject
    pub dropped: usize,
}

impl NormalizedBatch {
    /// Valid matches regardless of set.
    pub fn valid_matches(&self) -> usize {
        self.records.len() + self.other_set
    }

    /// Check the batch has enough matches, overall and on `set`.
    pub fn require(&self, min_records: usize, set: u32) -> Result<(), AnalysisError> {
        if self.valid_matches() < min_records {
            return Err(AnalysisError::TooFewMatches {
                found: self.valid_matches(),
                required: min_records,
            });
        }

        if self.records.len() < min_records {
            return Err(AnalysisError::TooFewSetMatches {
                set,
                found: self.records.len(),
                required: min_records,
            });
        }

        Ok(())
    }
}

/// Normalize raw matches for `subject_id`, keeping only `target_set` matches.
///
/// Malformed matches and matches without the subject are counted and skipped.
pub fn normalize(raw_matches: &[RawMatch], subject_id: &str, target_set: u32) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for raw in raw_matches {
        let match_id = raw.metadata.match_id.as_deref().unwrap_or("unknown");

        let Some(participant) = locate_participant(raw, subject_id) else {
            debug!("Subject not found in match {}", match_id);
            batch.dropped += 1;
            continue;
        };

        let Some(set) = raw.info.tft_set_number else {
            debug!("Match {} has no set number", match_id);
            batch.dropped += 1;
            continue;
        };

        let Some(record) = project(participant) else {
            debug!("Match {} has no usable placement", match_id);
            batch.dropped += 1;
            continue;
        };

        if set == target_set {
            batch.records.push(record);
        } else {
            batch.other_set += 1;
        }
    }

    batch
}

/// Find the subject's entry: inline id first, then metadata position.
fn locate_participant<'a>(raw: &'a RawMatch, subject_id: &str) -> Option<&'a RawParticipant> {
    let participants = &raw.info.participants;

    if let Some(p) = participants
        .iter()
        .find(|p| p.puuid.as_deref() == Some(subject_id))
    {
        return Some(p);
    }

    let index = raw
        .metadata
        .participants
        .iter()
        .position(|id| id == subject_id)?;
    participants.get(index)
}

fn project(participant: &RawParticipant) -> Option<MatchParticipantRecord> {
    let placement = participant.integral_placement()?;

    let traits = participant
        .traits
        .iter()
        .filter(|t| t.is_active() && !t.name.is_empty())
        .map(|t| t.name.clone())
        .collect();

    // Unnamed units are skipped along with their items so the lists stay aligned
    let named_units = || participant.units.iter().filter(|u| !u.character_id.is_empty());

    let units = named_units().map(|u| u.character_id.clone()).collect();

    let items: Vec<Vec<String>> = named_units()
        .map(|u| {
            u.item_names
                .iter()
                .take(MAX_ITEMS_PER_UNIT)
                .cloned()
                .collect::<Vec<_>>()
        })
        .collect();

    Some(MatchParticipantRecord {
        placement,
        level: participant.level,
        traits,
        units,
        items,
        augments: participant.augments.clone(),
    })
}
