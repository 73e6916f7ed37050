//! Current-calibration slot and JSON persistence
//!
//! Readers always see a complete calibration: either the previous one or the
//! new one, never a mix.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::error::{AnalysisError, Result};
use crate::processor::ProcessOutcome;
use crate::results::CalibrationResult;

/// Lock-free holder of the active calibration
#[derive(Debug, Default)]
pub struct CalibrationStore {
    current: ArcSwapOption<CalibrationResult>,
}

impl CalibrationStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    /// Store seeded with an existing calibration
    pub fn with_calibration(result: CalibrationResult) -> Self {
        let store = Self::new();
        store.replace(result);
        store
    }

    /// Snapshot of the active calibration
    pub fn current(&self) -> Option<Arc<CalibrationResult>> {
        self.current.load_full()
    }

    pub fn has_calibration(&self) -> bool {
        self.current.load().is_some()
    }

    /// Replace the active calibration, returning the previous one
    pub fn replace(&self, result: CalibrationResult) -> Option<Arc<CalibrationResult>> {
        self.current.swap(Some(Arc::new(result)))
    }

    /// Drop the active calibration, returning it
    pub fn clear(&self) -> Option<Arc<CalibrationResult>> {
        self.current.swap(None)
    }

    /// Adopt the outcome if it is a calibration; other outcomes leave the
    /// active calibration untouched
    pub fn accept(&self, outcome: &ProcessOutcome) -> bool {
        match outcome {
            ProcessOutcome::Calibration(result) => {
                self.replace(result.clone());
                tracing::info!(
                    "Active calibration replaced ({} colors)",
                    result.num_colors_detected()
                );
                true
            }
            _ => false,
        }
    }
}

/// Write a calibration as pretty-printed JSON
pub fn save_calibration(path: &Path, result: &CalibrationResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| AnalysisError::persistence("Failed to serialize calibration", e))?;
    std::fs::write(path, json).map_err(|e| {
        AnalysisError::persistence(format!("Failed to write {}", path.display()), e)
    })?;
    tracing::info!("Calibration data saved to {}", path.display());
    Ok(())
}

/// Read a calibration written by [`save_calibration`]
pub fn load_calibration(path: &Path) -> Result<CalibrationResult> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AnalysisError::persistence(format!("Failed to read {}", path.display()), e)
    })?;
    serde_json::from_str(&content).map_err(|e| {
        AnalysisError::persistence(format!("Failed to parse {}", path.display()), e)
    })
}
