//! Applying a stored calibration to new raw measurements
//!
//! The correction is anchored on the sample's dominant channel. The other two
//! channels are scaled by no more than the dominant channel's effective gain
//! so that hue is preserved and clamping at 255 cannot shift it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calibration::CorrectionCurves;
use crate::color::{Channel, PatchColor, Rgb8};
use crate::config::CorrectionConfig;
use crate::results::{AnalysisResult, CalibrationResult};

/// Why a measurement was returned uncorrected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionSkip {
    NoCalibration,
    NoCorrectionPoints,
    /// Every factor at the matched wavelength reached the unreliable threshold
    UnreliableFactors,
}

/// A raw reading together with its corrected value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectedMeasurement {
    pub raw_rgb: Rgb8,
    pub corrected_rgb: Rgb8,
    pub dominant_channel: Channel,
    pub estimated_wavelength_nm: u32,
    /// Calibration wavelength whose factors were used
    pub matched_wavelength_nm: Option<u32>,
    pub correction_applied: bool,
    pub skipped: Option<CorrectionSkip>,
}

impl CorrectedMeasurement {
    fn unchanged(raw: Rgb8, matched: Option<u32>, skip: CorrectionSkip) -> Self {
        let dominant = raw.dominant_channel();
        Self {
            raw_rgb: raw,
            corrected_rgb: raw,
            dominant_channel: dominant,
            estimated_wavelength_nm: dominant.peak_wavelength_nm(),
            matched_wavelength_nm: matched,
            correction_applied: false,
            skipped: Some(skip),
        }
    }
}

/// Applies correction factors to raw RGB measurements
#[derive(Debug, Clone)]
pub struct CorrectionApplier {
    unreliable_factor_threshold: f64,
}

impl Default for CorrectionApplier {
    fn default() -> Self {
        Self::new(&CorrectionConfig::default())
    }
}

impl CorrectionApplier {
    pub fn new(config: &CorrectionConfig) -> Self {
        Self {
            unreliable_factor_threshold: config.unreliable_factor_threshold,
        }
    }

    /// Correct one measurement; without a calibration the raw value comes back
    pub fn correct(&self, raw: Rgb8, calibration: Option<&CalibrationResult>) -> CorrectedMeasurement {
        match calibration {
            Some(cal) => self.correct_with_curves(raw, &cal.correction_curves),
            None => CorrectedMeasurement::unchanged(raw, None, CorrectionSkip::NoCalibration),
        }
    }

    /// Correct one measurement against explicit curves
    pub fn correct_with_curves(&self, raw: Rgb8, curves: &CorrectionCurves) -> CorrectedMeasurement {
        let dominant = raw.dominant_channel();
        let estimated = dominant.peak_wavelength_nm();

        let Some(point) = curves.nearest_point(estimated) else {
            return CorrectedMeasurement::unchanged(raw, None, CorrectionSkip::NoCorrectionPoints);
        };
        let factors = point.factors;

        if factors.to_array().iter().all(|f| *f >= self.unreliable_factor_threshold) {
            tracing::warn!(
                "Correction factors at {}nm all >= {}; returning raw values",
                point.wavelength_nm,
                self.unreliable_factor_threshold
            );
            return CorrectedMeasurement::unchanged(
                raw,
                Some(point.wavelength_nm),
                CorrectionSkip::UnreliableFactors,
            );
        }

        let raw_dom = raw.get(dominant) as f64;
        let f_dom = factors.get(dominant);
        let corrected_dom = (raw_dom * f_dom).clamp(0.0, 255.0);
        let ratio = if raw_dom > 0.0 { corrected_dom / raw_dom } else { f_dom };

        let channel_value = |channel: Channel| -> u8 {
            let v = if channel == dominant {
                corrected_dom
            } else {
                let gain = ratio.min(factors.get(channel));
                (raw.get(channel) as f64 * gain).clamp(0.0, 255.0)
            };
            v.round() as u8
        };
        let corrected = Rgb8::new(
            channel_value(Channel::Red),
            channel_value(Channel::Green),
            channel_value(Channel::Blue),
        );

        tracing::debug!(
            "Corrected RGB({}, {}, {}) -> RGB({}, {}, {}) using {}nm",
            raw.r,
            raw.g,
            raw.b,
            corrected.r,
            corrected.g,
            corrected.b,
            point.wavelength_nm
        );

        CorrectedMeasurement {
            raw_rgb: raw,
            corrected_rgb: corrected,
            dominant_channel: dominant,
            estimated_wavelength_nm: estimated,
            matched_wavelength_nm: Some(point.wavelength_nm),
            correction_applied: true,
            skipped: None,
        }
    }

    /// Correct every region of an analysis run
    pub fn apply_to_regions(
        &self,
        analysis: &AnalysisResult,
        calibration: Option<&CalibrationResult>,
    ) -> BTreeMap<PatchColor, CorrectedMeasurement> {
        analysis
            .color_regions
            .iter()
            .map(|(color, region)| (*color, self.correct(region.mean_rgb, calibration)))
            .collect()
    }
}
