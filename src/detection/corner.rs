//! Dark corner sampling for shadow baseline estimation

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::color::{BoundingBox, ChannelValues, RegionStats};
use crate::constants::detection::CORNER_FRACTION;

/// Image corner, in sampling order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }
}

/// Mean color of one corner crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerRegion {
    pub corner: Corner,
    /// Mean color, not truncated
    pub mean_rgb: ChannelValues,
    pub rect: BoundingBox,
    pub pixel_count: usize,
}

/// Samples fixed-size crops at the four image corners
#[derive(Debug, Clone, Copy)]
pub struct CornerSampler {
    fraction: f64,
}

impl Default for CornerSampler {
    fn default() -> Self {
        Self::new(CORNER_FRACTION)
    }
}

impl CornerSampler {
    /// Create a sampler whose crops span `fraction` of width and height
    ///
    /// The fraction is clamped to `[0, 0.5]` so opposite crops never overlap.
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 0.5),
        }
    }

    /// Crop size for an image, floored to whole pixels
    pub fn crop_size(&self, width: u32, height: u32) -> (u32, u32) {
        (
            (width as f64 * self.fraction).floor() as u32,
            (height as f64 * self.fraction).floor() as u32,
        )
    }

    /// Crop rectangles in [`Corner::ALL`] order; empty when a crop has zero area
    pub fn corner_rects(&self, width: u32, height: u32) -> Vec<(Corner, BoundingBox)> {
        let (cw, ch) = self.crop_size(width, height);
        if cw == 0 || ch == 0 {
            return Vec::new();
        }

        Corner::ALL
            .iter()
            .map(|&corner| {
                let x = match corner {
                    Corner::TopLeft | Corner::BottomLeft => 0,
                    Corner::TopRight | Corner::BottomRight => width.saturating_sub(cw),
                };
                let y = match corner {
                    Corner::TopLeft | Corner::TopRight => 0,
                    Corner::BottomLeft | Corner::BottomRight => height.saturating_sub(ch),
                };
                (corner, BoundingBox { x, y, width: cw, height: ch })
            })
            .collect()
    }

    /// Sample every corner crop with non-zero area
    pub fn sample(&self, image: &RgbImage) -> Vec<CornerRegion> {
        let rects = self.corner_rects(image.width(), image.height());
        if rects.is_empty() {
            tracing::warn!(
                "Image {}x{} too small for corner sampling",
                image.width(),
                image.height()
            );
        }

        rects
            .into_iter()
            .map(|(corner, rect)| {
                let mut stats = RegionStats::new();
                for y in rect.y..rect.y + rect.height {
                    for x in rect.x..rect.x + rect.width {
                        stats.push(x, y, image.get_pixel(x, y).0);
                    }
                }
                let mean = stats.mean();
                tracing::debug!(
                    "Corner {:?}: RGB({:.1}, {:.1}, {:.1})",
                    corner,
                    mean.r,
                    mean.g,
                    mean.b
                );
                CornerRegion {
                    corner,
                    mean_rgb: mean,
                    rect,
                    pixel_count: stats.count(),
                }
            })
            .collect()
    }
}
