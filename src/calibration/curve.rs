//! Per-wavelength, per-channel correction factors
//!
//! The fitter turns baseline-corrected patch intensities into multiplicative
//! factors that map the camera's response onto the reference response:
//!
//! 1. Normalise each channel by its maximum over all wavelengths
//! 2. Divide the reference by the floored normalised value
//! 3. Clip the result to the configured bounds, recording saturation
//!
//! A smoothing polynomial is fitted per channel for charting only.

use serde::{Deserialize, Serialize};

use crate::calibration::{Polynomial, ReferenceResponseTable};
use crate::color::{Channel, ChannelValues};
use crate::config::CalibrationConfig;
use crate::error::ProcessingNotice;

/// Unclipped factor mapping a measured intensity onto its reference
///
/// The measured value is floored at `floor` to avoid division by zero.
pub fn correction_factor(reference: f64, measured: f64, floor: f64) -> f64 {
    reference / measured.max(floor)
}

/// Clip a factor to `[min, max]`; the flag is set when clipping changed it
pub fn clip_factor(factor: f64, min: f64, max: f64) -> (f64, bool) {
    let clipped = factor.clamp(min, max);
    (clipped, clipped != factor)
}

/// Correction data at one calibration wavelength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionPoint {
    pub wavelength_nm: u32,
    /// Clipped multiplicative factors
    pub factors: ChannelValues,
    /// Corrected intensity divided by the channel maximum
    pub raw_normalized: ChannelValues,
    /// `raw_normalized * factors`
    pub final_corrected: ChannelValues,
    /// Reference response used for this point
    pub reference: ChannelValues,
}

/// A factor that hit a clip bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturatedFactor {
    pub wavelength_nm: u32,
    pub channel: Channel,
    pub unclipped: f64,
}

impl SaturatedFactor {
    pub fn notice(&self) -> ProcessingNotice {
        ProcessingNotice::SaturatedCorrectionFactor {
            wavelength_nm: self.wavelength_nm,
            channel: self.channel,
            unclipped: self.unclipped,
        }
    }
}

/// Smoothed factor curves, one per channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayCurves {
    pub r: Polynomial,
    pub g: Polynomial,
    pub b: Polynomial,
}

impl DisplayCurves {
    pub fn get(&self, channel: Channel) -> &Polynomial {
        match channel {
            Channel::Red => &self.r,
            Channel::Green => &self.g,
            Channel::Blue => &self.b,
        }
    }

    /// Evaluate all three curves at a wavelength
    pub fn evaluate(&self, wavelength_nm: f64) -> ChannelValues {
        ChannelValues::from_fn(|c| self.get(c).evaluate(wavelength_nm))
    }
}

/// Fitted correction curves, ordered by wavelength
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrectionCurves {
    pub points: Vec<CorrectionPoint>,
    /// Present when at least two distinct wavelengths were fitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayCurves>,
    #[serde(default)]
    pub saturated: Vec<SaturatedFactor>,
}

impl CorrectionCurves {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn wavelengths(&self) -> Vec<u32> {
        self.points.iter().map(|p| p.wavelength_nm).collect()
    }

    /// `(wavelength, factor)` pairs for one channel
    pub fn channel_points(&self, channel: Channel) -> Vec<(u32, f64)> {
        self.points
            .iter()
            .map(|p| (p.wavelength_nm, p.factors.get(channel)))
            .collect()
    }

    /// Nearest data point; a distance tie picks the shorter wavelength
    pub fn nearest_point(&self, wavelength_nm: u32) -> Option<&CorrectionPoint> {
        let mut best: Option<&CorrectionPoint> = None;
        for point in &self.points {
            let d = point.wavelength_nm.abs_diff(wavelength_nm);
            match best {
                Some(b) if b.wavelength_nm.abs_diff(wavelength_nm) < d => {}
                Some(b) if b.wavelength_nm.abs_diff(wavelength_nm) == d
                    && b.wavelength_nm < point.wavelength_nm => {}
                _ => best = Some(point),
            }
        }
        best
    }

    /// Piecewise-linear factor between data points, held constant past the ends
    pub fn interpolated_factor(&self, wavelength_nm: f64, channel: Channel) -> Option<f64> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if wavelength_nm <= first.wavelength_nm as f64 {
            return Some(first.factors.get(channel));
        }
        if wavelength_nm >= last.wavelength_nm as f64 {
            return Some(last.factors.get(channel));
        }

        self.points.windows(2).find_map(|pair| {
            let (x0, x1) = (pair[0].wavelength_nm as f64, pair[1].wavelength_nm as f64);
            if wavelength_nm < x0 || wavelength_nm > x1 {
                return None;
            }
            let (y0, y1) = (pair[0].factors.get(channel), pair[1].factors.get(channel));
            if x1 == x0 {
                return Some(y0);
            }
            Some(y0 + (y1 - y0) * (wavelength_nm - x0) / (x1 - x0))
        })
    }

    /// Mean of every emitted factor, or 0 with no points
    pub fn average_factor(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.points.iter().map(|p| p.factors.r + p.factors.g + p.factors.b).sum();
        sum / (self.points.len() * 3) as f64
    }
}

/// Derives [`CorrectionCurves`] from baseline-corrected intensities
pub struct CorrectionCurveFitter {
    reference: ReferenceResponseTable,
    factor_min: f64,
    factor_max: f64,
    normalization_floor: f64,
    polynomial_degree: usize,
}

impl Default for CorrectionCurveFitter {
    fn default() -> Self {
        Self::new(&CalibrationConfig::default())
    }
}

impl CorrectionCurveFitter {
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            reference: ReferenceResponseTable::new(),
            factor_min: config.factor_min,
            factor_max: config.factor_max,
            normalization_floor: config.normalization_floor,
            polynomial_degree: config.polynomial_degree,
        }
    }

    /// Fit correction curves to `(wavelength, corrected intensity)` samples
    pub fn fit(&self, intensities: &[(u32, ChannelValues)]) -> CorrectionCurves {
        let mut samples = intensities.to_vec();
        samples.sort_by_key(|(wl, _)| *wl);

        let max = ChannelValues::from_fn(|c| {
            let m = samples.iter().map(|(_, v)| v.get(c)).fold(0.0_f64, f64::max);
            if m > 0.0 {
                m
            } else {
                1.0
            }
        });

        let mut points = Vec::with_capacity(samples.len());
        let mut saturated = Vec::new();

        for (wavelength_nm, corrected) in samples {
            let reference = self.reference.response(wavelength_nm);
            let raw_normalized = ChannelValues::from_fn(|c| corrected.get(c) / max.get(c));

            let mut factors = ChannelValues::default();
            for channel in Channel::ALL {
                let unclipped = correction_factor(
                    reference.get(channel),
                    raw_normalized.get(channel),
                    self.normalization_floor,
                );
                let (factor, clipped) = clip_factor(unclipped, self.factor_min, self.factor_max);
                if clipped {
                    tracing::warn!(
                        "{} correction factor at {}nm clipped from {:.3} to {:.3}",
                        channel,
                        wavelength_nm,
                        unclipped,
                        factor
                    );
                    saturated.push(SaturatedFactor {
                        wavelength_nm,
                        channel,
                        unclipped,
                    });
                }
                factors.set(channel, factor);
            }

            let final_corrected = ChannelValues::from_fn(|c| raw_normalized.get(c) * factors.get(c));
            tracing::debug!(
                "{}nm: normalized=({:.3}, {:.3}, {:.3}) factors=({:.3}, {:.3}, {:.3})",
                wavelength_nm,
                raw_normalized.r,
                raw_normalized.g,
                raw_normalized.b,
                factors.r,
                factors.g,
                factors.b
            );

            points.push(CorrectionPoint {
                wavelength_nm,
                factors,
                raw_normalized,
                final_corrected,
                reference,
            });
        }

        let display = self.fit_display(&points);
        CorrectionCurves {
            points,
            display,
            saturated,
        }
    }

    fn fit_display(&self, points: &[CorrectionPoint]) -> Option<DisplayCurves> {
        let xs: Vec<f64> = points.iter().map(|p| p.wavelength_nm as f64).collect();
        let fit = |channel: Channel| {
            let ys: Vec<f64> = points.iter().map(|p| p.factors.get(channel)).collect();
            Polynomial::fit(&xs, &ys, self.polynomial_degree)
        };
        Some(DisplayCurves {
            r: fit(Channel::Red)?,
            g: fit(Channel::Green)?,
            b: fit(Channel::Blue)?,
        })
    }
}
