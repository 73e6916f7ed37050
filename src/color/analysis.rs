//! Region color statistics
//!
//! Accumulates per-pixel sums for a detected region and reduces them to:
//! - Mean color (truncated to 8 bits or kept as floating point)
//! - Centroid and bounding box
//! - Overall warm/cool classification across several regions

use serde::{Deserialize, Serialize};

use crate::color::{ChannelValues, Rgb8};

/// Integer pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Running sums over the pixels of one region
#[derive(Debug, Clone, Default)]
pub struct RegionStats {
    count: u64,
    sum: [u64; 3],
    sum_x: u64,
    sum_y: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl RegionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: u32, y: u32, px: [u8; 3]) {
        if self.count == 0 {
            self.min_x = x;
            self.min_y = y;
            self.max_x = x;
            self.max_y = y;
        } else {
            self.min_x = self.min_x.min(x);
            self.min_y = self.min_y.min(y);
            self.max_x = self.max_x.max(x);
            self.max_y = self.max_y.max(y);
        }
        self.count += 1;
        for (acc, v) in self.sum.iter_mut().zip(px) {
            *acc += v as u64;
        }
        self.sum_x += x as u64;
        self.sum_y += y as u64;
    }

    pub fn count(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Floating point mean color; zero for an empty region
    pub fn mean(&self) -> ChannelValues {
        if self.count == 0 {
            return ChannelValues::default();
        }
        let n = self.count as f64;
        ChannelValues::new(
            self.sum[0] as f64 / n,
            self.sum[1] as f64 / n,
            self.sum[2] as f64 / n,
        )
    }

    /// Mean color truncated toward zero to 8 bits
    pub fn mean_rgb8(&self) -> Rgb8 {
        if self.count == 0 {
            return Rgb8::default();
        }
        Rgb8::new(
            (self.sum[0] / self.count) as u8,
            (self.sum[1] / self.count) as u8,
            (self.sum[2] / self.count) as u8,
        )
    }

    pub fn centroid(&self) -> PixelPoint {
        if self.count == 0 {
            return PixelPoint::default();
        }
        PixelPoint {
            x: (self.sum_x / self.count) as u32,
            y: (self.sum_y / self.count) as u32,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        if self.count == 0 {
            return BoundingBox::default();
        }
        BoundingBox {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x + 1,
            height: self.max_y - self.min_y + 1,
        }
    }
}

/// Overall color temperature of a set of detected regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTemperature {
    Warm,
    Cool,
    Neutral,
}

/// Classify regions as warm or cool by pixel-weighted red/blue balance
///
/// A region counts as warm when its red exceeds its blue. One side wins only
/// when it outweighs the other by 20%.
pub fn classify_temperature(regions: impl IntoIterator<Item = (Rgb8, usize)>) -> ColorTemperature {
    let mut warm = 0.0;
    let mut cool = 0.0;
    let mut total = 0.0;

    for (rgb, pixels) in regions {
        let weight = pixels as f64;
        total += weight;
        if rgb.r > rgb.b {
            warm += weight;
        } else {
            cool += weight;
        }
    }

    if total == 0.0 {
        return ColorTemperature::Neutral;
    }

    if warm > cool * 1.2 {
        ColorTemperature::Warm
    } else if cool > warm * 1.2 {
        ColorTemperature::Cool
    } else {
        ColorTemperature::Neutral
    }
}
