//! Result types produced by a processing run
//!
//! A [`CalibrationResult`] is created wholesale, never mutated, and is what
//! gets stored and persisted. An [`AnalysisResult`] is ephemeral.

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::calibration::{AnalysisReason, Baseline, CorrectionCurves};
use crate::color::{ChannelValues, ColorTemperature, PatchColor};
use crate::constants::correction::CALIBRATION_SCHEMA_VERSION;
use crate::detection::{ColorRegion, CornerRegion, ImageSize};
use crate::error::ProcessingNotice;

/// Current time at the millisecond precision used on the wire
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Summary figures for a calibration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationStatistics {
    pub num_colors_detected: usize,
    pub num_black_corners: usize,
    /// `[min, max]` calibrated wavelength, `[0, 0]` when none
    pub wavelength_range: [u32; 2],
    /// Mean of every emitted correction factor
    pub avg_correction_factor: f64,
    /// Number of factors pinned to a clip bound
    pub saturated_factors: usize,
    pub degraded_baseline: bool,
}

impl CalibrationStatistics {
    pub fn from_parts(
        color_regions: &BTreeMap<PatchColor, ColorRegion>,
        corner_regions: &[CornerRegion],
        baseline: &Baseline,
        curves: &CorrectionCurves,
    ) -> Self {
        let wavelengths = curves.wavelengths();
        let wavelength_range = match (wavelengths.first(), wavelengths.last()) {
            (Some(&lo), Some(&hi)) => [lo, hi],
            _ => [0, 0],
        };

        Self {
            num_colors_detected: color_regions.len(),
            num_black_corners: corner_regions.len(),
            wavelength_range,
            avg_correction_factor: curves.average_factor(),
            saturated_factors: curves.saturated.len(),
            degraded_baseline: baseline.degraded,
        }
    }
}

/// Complete calibration derived from one chart photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub schema_version: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub image_size: ImageSize,
    pub color_regions: BTreeMap<PatchColor, ColorRegion>,
    pub corner_regions: Vec<CornerRegion>,
    pub baseline: Baseline,
    /// Patch means before baseline subtraction, by wavelength
    pub raw_intensities: BTreeMap<u32, ChannelValues>,
    /// Patch means after baseline subtraction, by wavelength
    pub corrected_intensities: BTreeMap<u32, ChannelValues>,
    pub correction_curves: CorrectionCurves,
    pub statistics: CalibrationStatistics,
    #[serde(default)]
    pub notices: Vec<ProcessingNotice>,
}

impl CalibrationResult {
    /// Assemble a result stamped with the current time
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        image_size: ImageSize,
        color_regions: BTreeMap<PatchColor, ColorRegion>,
        corner_regions: Vec<CornerRegion>,
        baseline: Baseline,
        raw_intensities: BTreeMap<u32, ChannelValues>,
        corrected_intensities: BTreeMap<u32, ChannelValues>,
        correction_curves: CorrectionCurves,
        notices: Vec<ProcessingNotice>,
    ) -> Self {
        let statistics = CalibrationStatistics::from_parts(
            &color_regions,
            &corner_regions,
            &baseline,
            &correction_curves,
        );
        Self {
            schema_version: CALIBRATION_SCHEMA_VERSION,
            timestamp: now_millis(),
            image_size,
            color_regions,
            corner_regions,
            baseline,
            raw_intensities,
            corrected_intensities,
            correction_curves,
            statistics,
            notices,
        }
    }

    pub fn num_colors_detected(&self) -> usize {
        self.color_regions.len()
    }
}

/// Raw patch readings from a run that did not calibrate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub image_size: ImageSize,
    pub color_regions: BTreeMap<PatchColor, ColorRegion>,
    pub num_colors_detected: usize,
    pub reason: AnalysisReason,
    pub message: String,
    pub temperature: ColorTemperature,
    #[serde(default)]
    pub notices: Vec<ProcessingNotice>,
}

impl AnalysisResult {
    pub fn new(
        image_size: ImageSize,
        color_regions: BTreeMap<PatchColor, ColorRegion>,
        reason: AnalysisReason,
        required_colors: usize,
    ) -> Self {
        let n = color_regions.len();
        let (message, notices) = match reason {
            AnalysisReason::Forced => (
                format!("Analysis mode: detected {} color region(s)", n),
                Vec::new(),
            ),
            AnalysisReason::InsufficientColors => {
                let notice = ProcessingNotice::InsufficientColorsForCalibration {
                    detected: n,
                    required: required_colors,
                };
                (notice.to_string(), vec![notice])
            }
        };
        let temperature = crate::color::classify_temperature(
            color_regions.values().map(|r| (r.mean_rgb, r.pixel_count)),
        );

        Self {
            timestamp: now_millis(),
            image_size,
            num_colors_detected: n,
            color_regions,
            reason,
            message,
            temperature,
            notices,
        }
    }
}
