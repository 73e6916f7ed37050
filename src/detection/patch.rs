//! Calibration patch detection by HSV thresholding
//!
//! For each of the six chart colours:
//! - Threshold the HSV raster with the colour's range(s)
//! - Clean the mask with a morphological close then open
//! - Reject masks below the minimum area
//! - Summarize the surviving pixels as a [`ColorRegion`]

use std::collections::BTreeMap;

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::color::{BoundingBox, ColorConverter, Hsv8, PatchColor, PixelPoint, RegionStats, Rgb8};
use crate::config::{DetectionConfig, RegionSelection};
use crate::constants::detection::{MIN_REGION_PIXELS, MORPH_KERNEL_SIZE};
use crate::detection::mask;

/// One detected calibration patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRegion {
    pub color: PatchColor,
    pub wavelength_nm: u32,
    /// Mean color over the region, truncated to 8 bits
    pub mean_rgb: Rgb8,
    pub pixel_count: usize,
    pub center: PixelPoint,
    pub bbox: BoundingBox,
}

/// Patch detector implementing per-colour HSV segmentation
pub struct PatchDetector {
    converter: ColorConverter,
    min_region_pixels: usize,
    morph_kernel_size: usize,
    selection: RegionSelection,
}

impl Default for PatchDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchDetector {
    /// Create a new patch detector with default parameters
    pub fn new() -> Self {
        Self {
            converter: ColorConverter::new(),
            min_region_pixels: MIN_REGION_PIXELS,
            morph_kernel_size: MORPH_KERNEL_SIZE,
            selection: RegionSelection::AllMasked,
        }
    }

    /// Create a patch detector from configuration
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            converter: ColorConverter::new(),
            min_region_pixels: config.min_region_pixels,
            morph_kernel_size: config.morph_kernel_size,
            selection: config.region_selection,
        }
    }

    /// Detect every chart colour present in the image
    ///
    /// Returns 0 to 6 regions keyed by colour.
    pub fn detect(&self, image: &RgbImage) -> BTreeMap<PatchColor, ColorRegion> {
        let hsv = self.hsv_raster(image);
        let mut regions = BTreeMap::new();

        for color in PatchColor::ALL {
            match self.detect_color(image, &hsv, color) {
                Some(region) => {
                    tracing::debug!(
                        "Found {}: RGB({}, {}, {}) at ({}, {}), {} px",
                        color,
                        region.mean_rgb.r,
                        region.mean_rgb.g,
                        region.mean_rgb.b,
                        region.center.x,
                        region.center.y,
                        region.pixel_count
                    );
                    regions.insert(color, region);
                }
                None => tracing::debug!("{} region not found or too small", color),
            }
        }

        tracing::debug!("Extracted {}/6 color regions", regions.len());
        regions
    }

    /// Convert the whole image to 8-bit HSV once, shared by all colour masks
    pub fn hsv_raster(&self, image: &RgbImage) -> Vec<Hsv8> {
        image
            .pixels()
            .map(|px| self.converter.rgb_to_hsv(Rgb8::from(px.0)))
            .collect()
    }

    /// Thresholded and cleaned mask for one colour
    pub fn color_mask(&self, image: &RgbImage, hsv: &[Hsv8], color: PatchColor) -> GrayImage {
        let ranges = color.hsv_ranges();
        let width = image.width();
        let raw = mask::mask_from_fn(width, image.height(), |x, y| {
            hsv[y as usize * width as usize + x as usize].in_any(ranges)
        });
        mask::clean_mask(&raw, self.morph_kernel_size)
    }

    /// Detect a single colour, or `None` if it is absent or below minimum area
    pub fn detect_color(&self, image: &RgbImage, hsv: &[Hsv8], color: PatchColor) -> Option<ColorRegion> {
        let color_mask = self.color_mask(image, hsv, color);
        if mask::mask_count(&color_mask) < self.min_region_pixels {
            return None;
        }

        let region_mask = match self.selection {
            RegionSelection::AllMasked => color_mask,
            RegionSelection::LargestComponent => {
                let largest = mask::largest_component(&color_mask)?;
                if mask::mask_count(&largest) < self.min_region_pixels {
                    return None;
                }
                largest
            }
        };

        let mut stats = RegionStats::new();
        for (x, y) in mask::mask_pixels(&region_mask) {
            stats.push(x, y, image.get_pixel(x, y).0);
        }

        Some(ColorRegion {
            color,
            wavelength_nm: color.wavelength_nm(),
            mean_rgb: stats.mean_rgb8(),
            pixel_count: stats.count(),
            center: stats.centroid(),
            bbox: stats.bounding_box(),
        })
    }
}
