//! Error types for the spectral_scan library
//!
//! Fatal conditions are [`AnalysisError`] values. Conditions that degrade a run
//! without failing it are [`ProcessingNotice`] values carried inside results.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Channel;

/// Result type alias for spectral_scan operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Fatal error conditions for a processing call
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Image bytes could not be decoded into a raster
    #[error("Failed to decode image: {message}")]
    DecodeError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// None of the six target colours was found
    #[error("No distinct colors detected")]
    NoColorsDetected,

    /// No corner region could be sampled, so no shadow baseline exists
    #[error("No corner regions available for baseline estimation ({width}x{height} image)")]
    BaselineUnavailable { width: u32, height: u32 },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Calibration data could not be saved or loaded
    #[error("Calibration persistence error: {message}")]
    PersistenceError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AnalysisError {
    /// Create a decode error with context
    pub fn decode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DecodeError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a persistence error with context
    pub fn persistence<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::PersistenceError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error indicates a condition a new photo could fix
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::NoColorsDetected | AnalysisError::BaselineUnavailable { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::DecodeError { .. } => {
                "Could not read the image. Please check the file format and try again.".to_string()
            }
            AnalysisError::NoColorsDetected => {
                "No distinct colors detected. This system looks for red, yellow, green, cyan, \
                 blue, or magenta colors. Try taking a photo of a colorful object like a phone \
                 case, book cover, or printed color chart."
                    .to_string()
            }
            AnalysisError::BaselineUnavailable { .. } => {
                "The image is too small to sample its dark corners. Please use a larger photo."
                    .to_string()
            }
            _ => "Color analysis failed. Please try with a different image.".to_string(),
        }
    }
}

/// Non-fatal conditions recorded while processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessingNotice {
    /// Calibration was possible in principle but too few patches were visible
    InsufficientColorsForCalibration { detected: usize, required: usize },
    /// Fewer than four corners contributed to the baseline
    DegradedBaseline { corners_used: usize },
    /// A correction factor was pinned to a clip bound
    SaturatedCorrectionFactor {
        wavelength_nm: u32,
        channel: Channel,
        unclipped: f64,
    },
}

impl std::fmt::Display for ProcessingNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingNotice::InsufficientColorsForCalibration { detected, required } => write!(
                f,
                "Detected {} color region(s) - insufficient for calibration (need {}) but available for analysis",
                detected, required
            ),
            ProcessingNotice::DegradedBaseline { corners_used } => write!(
                f,
                "Baseline estimated from {} of 4 corner regions",
                corners_used
            ),
            ProcessingNotice::SaturatedCorrectionFactor {
                wavelength_nm,
                channel,
                unclipped,
            } => write!(
                f,
                "{} correction at {}nm clipped (unclipped factor {:.3})",
                channel, wavelength_nm, unclipped
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated");
        let err = AnalysisError::decode("bad bytes", io);
        assert!(err.to_string().contains("bad bytes"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(AnalysisError::NoColorsDetected.is_recoverable());
        assert!(!AnalysisError::invalid("factor_min", 0.0).is_recoverable());
    }

    #[test]
    fn test_user_message_for_no_colors() {
        let msg = AnalysisError::NoColorsDetected.user_message();
        assert!(msg.contains("magenta"));
    }

    #[test]
    fn test_notice_serialization_is_tagged() {
        let notice = ProcessingNotice::DegradedBaseline { corners_used: 2 };
        let json = serde_json::to_string(&notice).unwrap();
        assert!(json.contains("\"kind\":\"degraded_baseline\""));
        assert!(json.contains("\"corners_used\":2"));
    }
}
