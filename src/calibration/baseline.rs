//! Shadow baseline estimation from the dark corners
//!
//! The baseline approximates the camera's black level and ambient stray light.
//! It is subtracted from every patch measurement before correction factors are
//! derived.

use serde::{Deserialize, Serialize};

use crate::color::{ChannelValues, Rgb8};
use crate::constants::detection::NUM_CORNERS;
use crate::detection::{CornerRegion, ImageSize};
use crate::error::{AnalysisError, ProcessingNotice, Result};

/// Per-channel shadow level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub values: ChannelValues,
    /// Number of corners averaged
    pub corners_used: usize,
    /// Fewer than four corners were available
    pub degraded: bool,
}

impl Baseline {
    /// Baseline-corrected intensity, floored at zero per channel
    pub fn subtract(&self, raw: ChannelValues) -> ChannelValues {
        ChannelValues::new(
            (raw.r - self.values.r).max(0.0),
            (raw.g - self.values.g).max(0.0),
            (raw.b - self.values.b).max(0.0),
        )
    }

    /// [`Baseline::subtract`] for an 8-bit patch mean
    pub fn subtract_rgb(&self, raw: Rgb8) -> ChannelValues {
        self.subtract(raw.to_values())
    }

    /// Notice to attach to results when the baseline is degraded
    pub fn notice(&self) -> Option<ProcessingNotice> {
        self.degraded.then_some(ProcessingNotice::DegradedBaseline {
            corners_used: self.corners_used,
        })
    }
}

/// Averages corner samples into a [`Baseline`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineEstimator;

impl BaselineEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Channel-wise mean of the available corner means
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::BaselineUnavailable` when no corners were sampled.
    pub fn estimate(&self, corners: &[CornerRegion], image_size: ImageSize) -> Result<Baseline> {
        if corners.is_empty() {
            return Err(AnalysisError::BaselineUnavailable {
                width: image_size.width,
                height: image_size.height,
            });
        }

        let n = corners.len() as f64;
        let sum = corners.iter().fold(ChannelValues::default(), |acc, c| {
            ChannelValues::new(
                acc.r + c.mean_rgb.r,
                acc.g + c.mean_rgb.g,
                acc.b + c.mean_rgb.b,
            )
        });
        let values = sum.map(|v| (v / n).max(0.0));
        let degraded = corners.len() < NUM_CORNERS;

        if degraded {
            tracing::warn!(
                "Baseline estimated from only {}/{} corners",
                corners.len(),
                NUM_CORNERS
            );
        }
        tracing::debug!(
            "Baseline (shadow): R={:.1}, G={:.1}, B={:.1}",
            values.r,
            values.g,
            values.b
        );

        Ok(Baseline {
            values,
            corners_used: corners.len(),
            degraded,
        })
    }
}
