//! Spectral calibration module
//!
//! This module turns detected patches and corners into per-wavelength,
//! per-channel correction factors and applies them to later measurements.

pub mod reference;
pub mod baseline;
pub mod mode;
pub mod polynomial;
pub mod curve;
pub mod applier;
pub mod store;

pub use reference::ReferenceResponseTable;
pub use baseline::{Baseline, BaselineEstimator};
pub use mode::{select_mode, AnalysisReason, ProcessingMode};
pub use polynomial::Polynomial;
pub use curve::{
    clip_factor, correction_factor, CorrectionCurveFitter, CorrectionCurves, CorrectionPoint,
    DisplayCurves, SaturatedFactor,
};
pub use applier::{CorrectedMeasurement, CorrectionApplier, CorrectionSkip};
pub use store::{load_calibration, save_calibration, CalibrationStore};
