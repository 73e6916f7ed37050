//! Configuration structures for the spectral_scan pipeline.
//!
//! This module defines all tunable parameters for calibration and
//! correction, organized into detection, calibration and correction groups.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use spectral_scan::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), spectral_scan::AnalysisError>(())
//! ```
//!
//! Missing fields in a JSON file fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{correction, detection};
use crate::{AnalysisError, Result};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Patch and corner detection
    pub detection: DetectionConfig,

    /// Correction curve derivation
    pub calibration: CalibrationConfig,

    /// Correction of later measurements
    pub correction: CorrectionConfig,
}

/// How pixels of a thresholded mask become a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSelection {
    /// Every masked pixel contributes
    #[default]
    AllMasked,
    /// Only the largest 8-connected component contributes
    LargestComponent,
}

/// Region detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum pixel count for a patch to count as detected
    pub min_region_pixels: usize,

    /// Morphological kernel size (square, odd)
    pub morph_kernel_size: usize,

    /// Corner crop size as fraction of width/height (0.0-0.5)
    pub corner_fraction: f64,

    /// Region selection strategy
    pub region_selection: RegionSelection,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_region_pixels: detection::MIN_REGION_PIXELS,
            morph_kernel_size: detection::MORPH_KERNEL_SIZE,
            corner_fraction: detection::CORNER_FRACTION,
            region_selection: RegionSelection::AllMasked,
        }
    }
}

/// Correction curve parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Patches required before a run may calibrate
    pub min_colors_for_calibration: usize,

    /// Lower clip bound on correction factors
    pub factor_min: f64,

    /// Upper clip bound on correction factors
    pub factor_max: f64,

    /// Floor on normalised intensity before division
    pub normalization_floor: f64,

    /// Maximum degree of the display polynomial
    pub polynomial_degree: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min_colors_for_calibration: correction::MIN_COLORS_FOR_CALIBRATION,
            factor_min: correction::FACTOR_MIN,
            factor_max: correction::FACTOR_MAX,
            normalization_floor: correction::NORMALIZATION_FLOOR,
            polynomial_degree: correction::DISPLAY_POLYNOMIAL_DEGREE,
        }
    }
}

/// Measurement correction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// When all three factors reach this value, correction is skipped
    pub unreliable_factor_threshold: f64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            unreliable_factor_threshold: correction::UNRELIABLE_FACTOR_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::config(format!("Failed to read {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| AnalysisError::config(format!("Failed to parse {}", path.display()), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json)
            .map_err(|e| AnalysisError::config(format!("Failed to write {}", path.display()), e))?;
        Ok(())
    }

    /// Reject parameter combinations the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if d.morph_kernel_size == 0 || d.morph_kernel_size % 2 == 0 || d.morph_kernel_size > 511 {
            return Err(AnalysisError::invalid("detection.morph_kernel_size", d.morph_kernel_size));
        }
        if !(d.corner_fraction > 0.0 && d.corner_fraction <= 0.5) {
            return Err(AnalysisError::invalid("detection.corner_fraction", d.corner_fraction));
        }

        let c = &self.calibration;
        if c.min_colors_for_calibration == 0 {
            return Err(AnalysisError::invalid(
                "calibration.min_colors_for_calibration",
                c.min_colors_for_calibration,
            ));
        }
        if !(c.factor_min > 0.0 && c.factor_min < c.factor_max) {
            return Err(AnalysisError::invalid(
                "calibration.factor_min",
                format!("{} (factor_max {})", c.factor_min, c.factor_max),
            ));
        }
        if !(c.normalization_floor > 0.0) {
            return Err(AnalysisError::invalid(
                "calibration.normalization_floor",
                c.normalization_floor,
            ));
        }

        let t = self.correction.unreliable_factor_threshold;
        if !(t > 0.0) {
            return Err(AnalysisError::invalid("correction.unreliable_factor_threshold", t));
        }
        Ok(())
    }
}
