//! Calibration vs analysis-only mode selection

use serde::{Deserialize, Serialize};

/// Why a run produced an analysis instead of a calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisReason {
    /// The caller asked for analysis
    Forced,
    /// Between one and `min_colors - 1` patches were found
    InsufficientColors,
}

/// Outcome of mode selection for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    Calibration,
    AnalysisOnly(AnalysisReason),
    /// No patches at all
    Error,
}

/// Decide how to process a photo from its detected patch count
///
/// | colours | forced | mode |
/// |---|---|---|
/// | 0 | any | `Error` |
/// | ≥ 1 | yes | `AnalysisOnly(Forced)` |
/// | ≥ `min_colors` | no | `Calibration` |
/// | 1 to `min_colors - 1` | no | `AnalysisOnly(InsufficientColors)` |
pub fn select_mode(num_colors: usize, force_analysis: bool, min_colors: usize) -> ProcessingMode {
    if num_colors == 0 {
        return ProcessingMode::Error;
    }
    if force_analysis {
        return ProcessingMode::AnalysisOnly(AnalysisReason::Forced);
    }
    if num_colors >= min_colors {
        ProcessingMode::Calibration
    } else {
        ProcessingMode::AnalysisOnly(AnalysisReason::InsufficientColors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::correction::MIN_COLORS_FOR_CALIBRATION;

    fn select_default_mode(num_colors: usize, force_analysis: bool) -> ProcessingMode {
        select_mode(num_colors, force_analysis, MIN_COLORS_FOR_CALIBRATION)
    }

    #[test]
    fn test_zero_colors_is_error_even_when_forced() {
        assert_eq!(select_default_mode(0, false), ProcessingMode::Error);
        assert_eq!(select_default_mode(0, true), ProcessingMode::Error);
    }

    #[test]
    fn test_force_wins_over_calibration() {
        for n in 1..=6 {
            assert_eq!(
                select_default_mode(n, true),
                ProcessingMode::AnalysisOnly(AnalysisReason::Forced)
            );
        }
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(
            select_default_mode(3, false),
            ProcessingMode::AnalysisOnly(AnalysisReason::InsufficientColors)
        );
        assert_eq!(select_default_mode(4, false), ProcessingMode::Calibration);
        assert_eq!(select_default_mode(6, false), ProcessingMode::Calibration);
    }

    #[test]
    fn test_custom_threshold() {
        assert_eq!(select_mode(2, false, 2), ProcessingMode::Calibration);
        assert_eq!(
            select_mode(5, false, 6),
            ProcessingMode::AnalysisOnly(AnalysisReason::InsufficientColors)
        );
    }
}
