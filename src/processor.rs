//! End-to-end processing of one photo
//!
//! Decode, extract regions, select a mode, and in calibration mode estimate
//! the baseline and fit correction curves. Each call is independent.

use std::collections::BTreeMap;

use image::RgbImage;

use crate::calibration::{
    select_mode, AnalysisReason, BaselineEstimator, CorrectionCurveFitter, ProcessingMode,
};
use crate::color::ChannelValues;
use crate::config::PipelineConfig;
use crate::detection::{ExtractedRegions, RegionExtractor};
use crate::error::{AnalysisError, Result};
use crate::image_loader::decode_image;
use crate::report::ProcessResponse;
use crate::results::{AnalysisResult, CalibrationResult};

/// Result of one processing call
#[derive(Debug)]
pub enum ProcessOutcome {
    Calibration(CalibrationResult),
    AnalysisOnly(AnalysisResult),
    Error(AnalysisError),
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ProcessOutcome::Error(_))
    }

    pub fn calibration(&self) -> Option<&CalibrationResult> {
        match self {
            ProcessOutcome::Calibration(result) => Some(result),
            _ => None,
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match self {
            ProcessOutcome::AnalysisOnly(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            ProcessOutcome::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Wire representation of this outcome
    pub fn to_response(&self) -> ProcessResponse {
        ProcessResponse::from(self)
    }
}

impl From<Result<ProcessOutcome>> for ProcessOutcome {
    fn from(result: Result<ProcessOutcome>) -> Self {
        result.unwrap_or_else(ProcessOutcome::Error)
    }
}

/// Configured calibration pipeline
pub struct SpectralProcessor {
    config: PipelineConfig,
    extractor: RegionExtractor,
    baseline: BaselineEstimator,
    fitter: CorrectionCurveFitter,
}

impl Default for SpectralProcessor {
    fn default() -> Self {
        Self::build(PipelineConfig::default())
    }
}

impl SpectralProcessor {
    /// Create a processor after validating the configuration
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidParameter` for a configuration the
    /// pipeline cannot run with.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PipelineConfig) -> Self {
        Self {
            extractor: RegionExtractor::new(&config.detection),
            baseline: BaselineEstimator::new(),
            fitter: CorrectionCurveFitter::new(&config.calibration),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process encoded image bytes
    pub fn process_bytes(&self, bytes: &[u8], force_analysis: bool) -> ProcessOutcome {
        match decode_image(bytes) {
            Ok(image) => self.process_image(&image, force_analysis),
            Err(err) => {
                tracing::warn!("Failed to load image: {}", err);
                ProcessOutcome::Error(err)
            }
        }
    }

    /// Process an already decoded image
    pub fn process_image(&self, image: &RgbImage, force_analysis: bool) -> ProcessOutcome {
        let regions = self.extractor.extract(image);
        self.process_regions(regions, force_analysis).into()
    }

    /// Mode selection and, when calibrating, baseline and curve fitting
    pub fn process_regions(&self, regions: ExtractedRegions, force_analysis: bool) -> Result<ProcessOutcome> {
        let num_colors = regions.num_colors();
        let min_colors = self.config.calibration.min_colors_for_calibration;

        match select_mode(num_colors, force_analysis, min_colors) {
            ProcessingMode::Error => {
                tracing::warn!("No distinct colors found in image");
                Err(AnalysisError::NoColorsDetected)
            }
            ProcessingMode::AnalysisOnly(reason) => {
                match reason {
                    AnalysisReason::Forced => tracing::info!(
                        "Force analysis mode: returning {} color(s) for analysis",
                        num_colors
                    ),
                    AnalysisReason::InsufficientColors => tracing::warn!(
                        "Only {} color(s) detected - returning for analysis only",
                        num_colors
                    ),
                }
                Ok(ProcessOutcome::AnalysisOnly(AnalysisResult::new(
                    regions.image_size,
                    regions.color_regions,
                    reason,
                    min_colors,
                )))
            }
            ProcessingMode::Calibration => self.calibrate(regions).map(ProcessOutcome::Calibration),
        }
    }

    fn calibrate(&self, regions: ExtractedRegions) -> Result<CalibrationResult> {
        let baseline = self.baseline.estimate(&regions.corner_regions, regions.image_size)?;

        let raw_intensities: BTreeMap<u32, ChannelValues> = regions
            .color_regions
            .values()
            .map(|r| (r.wavelength_nm, r.mean_rgb.to_values()))
            .collect();
        let corrected_intensities: BTreeMap<u32, ChannelValues> = regions
            .color_regions
            .values()
            .map(|r| (r.wavelength_nm, baseline.subtract_rgb(r.mean_rgb)))
            .collect();

        let samples: Vec<(u32, ChannelValues)> =
            corrected_intensities.iter().map(|(wl, v)| (*wl, *v)).collect();
        let curves = self.fitter.fit(&samples);

        let mut notices: Vec<_> = baseline.notice().into_iter().collect();
        notices.extend(curves.saturated.iter().map(|s| s.notice()));

        let result = CalibrationResult::new(
            regions.image_size,
            regions.color_regions,
            regions.corner_regions,
            baseline,
            raw_intensities,
            corrected_intensities,
            curves,
            notices,
        );

        tracing::info!(
            "Calibration complete: {} colors, baseline correction applied",
            result.num_colors_detected()
        );
        Ok(result)
    }
}

/// Process encoded image bytes with the default configuration
///
/// # Example
///
/// ```rust,no_run
/// use spectral_scan::{process, ProcessOutcome};
///
/// let bytes = std::fs::read("chart.jpg").unwrap();
/// match process(&bytes, false) {
///     ProcessOutcome::Calibration(cal) => println!("{} colors", cal.num_colors_detected()),
///     ProcessOutcome::AnalysisOnly(analysis) => println!("{}", analysis.message),
///     ProcessOutcome::Error(err) => eprintln!("{}", err.user_message()),
/// }
/// ```
pub fn process(image_bytes: &[u8], force_analysis: bool) -> ProcessOutcome {
    SpectralProcessor::default().process_bytes(image_bytes, force_analysis)
}
