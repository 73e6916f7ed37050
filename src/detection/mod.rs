//! Region detection module
//!
//! This module finds the six calibration patches by HSV thresholding and
//! samples the four dark corners used for the shadow baseline.

pub mod mask;
pub mod patch;
pub mod corner;
pub mod extractor;

pub use patch::{ColorRegion, PatchDetector};
pub use corner::{Corner, CornerRegion, CornerSampler};
pub use extractor::{ExtractedRegions, ImageSize, RegionExtractor};
