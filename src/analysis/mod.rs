//! Match analysis engine.
//!
//! Turns raw match records into rate rankings:
//! - Normalization of the subject player's board per match
//! - Top-4 / bottom-4 rate rankings per trait, item or augment
//! - Item-combination and synergy-trait breakdowns per unit
//!
//! Everything here is synchronous and free of I/O.

pub mod aggregate;
pub mod combos;
pub mod normalize;
pub mod units;

pub use aggregate::{aggregate, rank_dimension, AggregateParams, DimensionExtractor};
pub use combos::item_combinations;
pub use normalize::{normalize, NormalizedBatch};
pub use units::{summarize_units, unit_report, unit_rows, UnitAnalysisParams, UnitRow, UnitSummaryParams};

use thiserror::Error;

/// Errors that abort an analysis.
///
/// Per-match problems never show up here; those matches are skipped during
/// normalization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Insufficient data - only {found} valid matches found (need {required})")]
    TooFewMatches { found: usize, required: usize },

    #[error("Insufficient Set {set} data - only {found} matches from Set {set} (need {required})")]
    TooFewSetMatches {
        set: u32,
        found: usize,
        required: usize,
    },

    #[error("No {dimension} values found with more than {floor} appearances")]
    NoQualifyingValues { dimension: String, floor: u32 },

    #[error("Not enough games for {unit} (found {found}, need {required})")]
    InsufficientGames {
        unit: String,
        found: usize,
        required: usize,
    },

    #[error("Unit not found in match history: {0}")]
    UnitNotFound(String),
}

impl AnalysisError {
    /// True for failures that only more played matches can fix.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            AnalysisError::TooFewMatches { .. }
                | AnalysisError::TooFewSetMatches { .. }
                | AnalysisError::NoQualifyingValues { .. }
                | AnalysisError::InsufficientGames { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_family() {
        assert!(AnalysisError::TooFewMatches {
            found: 1,
            required: 3
        }
        .is_insufficient_data());
        assert!(AnalysisError::NoQualifyingValues {
            dimension: "trait".to_string(),
            floor: 10
        }
        .is_insufficient_data());
        assert!(!AnalysisError::UnitNotFound("TFT14_Jinx".to_string()).is_insufficient_data());
    }

    #[test]
    fn test_error_messages_carry_counts() {
        let err = AnalysisError::TooFewSetMatches {
            set: 14,
            found: 2,
            required: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient Set 14 data - only 2 matches from Set 14 (need 3)"
        );
    }
}
