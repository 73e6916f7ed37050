//! Color primitives, conversion and region statistics
//!
//! This module holds the channel and patch-colour types shared by the
//! detection and calibration stages, HSV conversion used for thresholding,
//! and accumulators that summarize pixel regions.

pub mod types;
pub mod conversion;
pub mod analysis;

pub use types::{Channel, ChannelValues, PatchColor, Rgb8};
pub use conversion::{ColorConverter, Hsv8};
pub use analysis::{classify_temperature, BoundingBox, ColorTemperature, PixelPoint, RegionStats};
