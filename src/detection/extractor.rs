//! Region extraction: calibration patches plus dark corners in one pass

use std::collections::BTreeMap;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::color::PatchColor;
use crate::config::DetectionConfig;
use crate::detection::{ColorRegion, CornerRegion, CornerSampler, PatchDetector};
use crate::image_loader::decode_image;
use crate::Result;

/// Pixel dimensions of an analysed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Everything the later stages need from one photo
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRegions {
    /// Detected patches, 0 to 6
    pub color_regions: BTreeMap<PatchColor, ColorRegion>,
    /// Corner samples, 0 to 4, in corner order
    pub corner_regions: Vec<CornerRegion>,
    pub image_size: ImageSize,
}

impl ExtractedRegions {
    pub fn num_colors(&self) -> usize {
        self.color_regions.len()
    }
}

/// Combines patch detection and corner sampling
pub struct RegionExtractor {
    patches: PatchDetector,
    corners: CornerSampler,
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

impl RegionExtractor {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            patches: PatchDetector::from_config(config),
            corners: CornerSampler::new(config.corner_fraction),
        }
    }

    /// Extract regions from a decoded raster
    pub fn extract(&self, image: &RgbImage) -> ExtractedRegions {
        let color_regions = self.patches.detect(image);
        let corner_regions = self.corners.sample(image);

        tracing::debug!(
            "Extracted {} color regions and {} corner regions from {}x{} image",
            color_regions.len(),
            corner_regions.len(),
            image.width(),
            image.height()
        );

        ExtractedRegions {
            color_regions,
            corner_regions,
            image_size: ImageSize {
                width: image.width(),
                height: image.height(),
            },
        }
    }

    /// Decode image bytes and extract regions
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::DecodeError` if the bytes are not a decodable image.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<ExtractedRegions> {
        let image = decode_image(bytes)?;
        Ok(self.extract(&image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisError;
    use image::Rgb;

    #[test]
    fn test_extract_patches_and_corners() {
        let mut img = RgbImage::from_pixel(200, 100, Rgb([12, 10, 8]));
        for y in 40..70 {
            for x in 50..80 {
                img.put_pixel(x, y, Rgb([30, 200, 30]));
            }
            for x in 110..140 {
                img.put_pixel(x, y, Rgb([30, 30, 200]));
            }
        }

        let regions = RegionExtractor::default().extract(&img);
        assert_eq!(regions.image_size, ImageSize { width: 200, height: 100 });
        assert_eq!(regions.num_colors(), 2);
        assert!(regions.color_regions.contains_key(&PatchColor::Green));
        assert!(regions.color_regions.contains_key(&PatchColor::Blue));
        assert_eq!(regions.corner_regions.len(), 4);
        assert_eq!(regions.corner_regions[2].mean_rgb.r, 12.0);
    }

    #[test]
    fn test_extract_bytes_rejects_garbage() {
        let result = RegionExtractor::default().extract_bytes(b"\x00\x01\x02");
        assert!(matches!(result, Err(AnalysisError::DecodeError { .. })));
    }
}
