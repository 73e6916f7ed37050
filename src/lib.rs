//! # Spectral Scan
//!
//! A Rust crate that turns a phone camera into a crude multi-channel
//! spectrometer.
//!
//! A photo of a reference chart with six known-wavelength colour patches and
//! four dark corners yields per-channel correction factors. These compensate
//! for the sensor's uneven spectral sensitivity and are then applied to raw
//! RGB readings of arbitrary objects.
//!
//! The pipeline:
//! - Detects the six patches by HSV thresholding and samples the dark corners
//! - Chooses between a calibration run and an analysis-only run
//! - Estimates the shadow baseline and subtracts it from every patch
//! - Derives clipped correction factors against a reference response table
//! - Corrects later measurements while preserving hue
//!
//! ## Example
//!
//! ```rust,no_run
//! use spectral_scan::{process, CalibrationStore, CorrectionApplier};
//!
//! let store = CalibrationStore::new();
//! let chart = std::fs::read("chart.jpg").unwrap();
//! store.accept(&process(&chart, false));
//!
//! let object = std::fs::read("object.jpg").unwrap();
//! if let Some(analysis) = process(&object, true).analysis() {
//!     let current = store.current();
//!     let corrected = CorrectionApplier::default().apply_to_regions(analysis, current.as_deref());
//!     for (color, m) in corrected {
//!         println!("{}: {:?} -> {:?}", color, m.raw_rgb, m.corrected_rgb);
//!     }
//! }
//! ```

pub mod error;
pub mod constants;
pub mod config;
pub mod color;
pub mod image_loader;
pub mod detection;
pub mod calibration;
pub mod results;
pub mod report;
pub mod processor;

pub use error::{AnalysisError, ProcessingNotice, Result};
pub use config::{CalibrationConfig, CorrectionConfig, DetectionConfig, PipelineConfig, RegionSelection};
pub use color::{Channel, ChannelValues, ColorTemperature, PatchColor, Rgb8};
pub use detection::{ColorRegion, CornerRegion, ExtractedRegions, ImageSize, RegionExtractor};
pub use calibration::{
    load_calibration, save_calibration, select_mode, AnalysisReason, Baseline, CalibrationStore,
    CorrectedMeasurement, CorrectionApplier, CorrectionCurves, CorrectionSkip, ProcessingMode,
};
pub use results::{AnalysisResult, CalibrationResult, CalibrationStatistics};
pub use report::ProcessResponse;
pub use processor::{process, ProcessOutcome, SpectralProcessor};
