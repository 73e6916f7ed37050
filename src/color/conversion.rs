//! Color space conversion utilities
//!
//! Provides the conversions the detector and report layers need:
//! - RGB (0-255) to 8-bit HSV for patch thresholding
//! - Hex color formatting for reports
//!
//! HSV uses the 8-bit convention: hue is half the angle in degrees
//! (`[0, 180]`), saturation and value are scaled to `[0, 255]`.

use palette::{FromColor, Hsv, Srgb};

use crate::color::Rgb8;
use crate::constants::hsv_ranges::HsvBounds;

/// 8-bit HSV pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsv8 {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv8 {
    /// Check inclusive containment in a `(lower, upper)` bound pair
    pub fn in_bounds(&self, bounds: &HsvBounds) -> bool {
        let (lo, hi) = bounds;
        (lo[0]..=hi[0]).contains(&self.h)
            && (lo[1]..=hi[1]).contains(&self.s)
            && (lo[2]..=hi[2]).contains(&self.v)
    }

    /// Check containment in any of several bound pairs
    pub fn in_any(&self, ranges: &[HsvBounds]) -> bool {
        ranges.iter().any(|b| self.in_bounds(b))
    }
}

/// Color converter for thresholding and display
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter;

impl ColorConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert RGB (0-255) to 8-bit HSV
    ///
    /// # Arguments
    ///
    /// * `rgb` - RGB sample with channels in range [0, 255]
    ///
    /// # Returns
    ///
    /// HSV with hue in [0, 180] and saturation/value in [0, 255]
    pub fn rgb_to_hsv(&self, rgb: Rgb8) -> Hsv8 {
        let srgb = Srgb::new(
            rgb.r as f32 / 255.0,
            rgb.g as f32 / 255.0,
            rgb.b as f32 / 255.0,
        );
        let hsv: Hsv = Hsv::from_color(srgb);

        // Hues from 359 degrees round up to 180 rather than wrapping to 0;
        // the upper red range includes 180.
        let degrees = hsv.hue.into_positive_degrees();
        Hsv8 {
            h: (degrees / 2.0).round().clamp(0.0, 180.0) as u8,
            s: (hsv.saturation * 255.0).round().clamp(0.0, 255.0) as u8,
            v: (hsv.value * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }

    /// Convert RGB to hexadecimal color string
    ///
    /// # Returns
    ///
    /// Hex color string (e.g., "#FF0000")
    pub fn rgb_to_hex(&self, rgb: Rgb8) -> String {
        format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
    }
}
