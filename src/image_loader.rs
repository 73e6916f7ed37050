//! Unified image decoding from bytes or files
//!
//! Turns encoded image bytes, or an image file, into an RGB raster for
//! region extraction.
//!
//! ## Supported Formats
//!
//! Via the `image` crate: JPEG, PNG, WebP, TIFF, BMP.
//!
//! ## Design
//!
//! Every image is converted to 8-bit RGB. Alpha is dropped and higher bit
//! depths are scaled down. A decode either yields a complete raster or a
//! `DecodeError`, never a partial image.

use std::io::Cursor;
use std::path::Path;

use image::{ImageReader, RgbImage};

use crate::error::{AnalysisError, Result};

/// Decode encoded image bytes into an 8-bit RGB raster
///
/// # Errors
///
/// Returns `AnalysisError::DecodeError` if:
/// - The byte buffer is empty
/// - The format cannot be recognised
/// - Decoding fails or the image has zero area
///
/// # Example
///
/// ```rust,no_run
/// use spectral_scan::image_loader::decode_image;
///
/// let bytes = std::fs::read("chart.jpg").unwrap();
/// let image = decode_image(&bytes)?;
/// println!("Decoded image: {}x{}", image.width(), image.height());
/// # Ok::<(), spectral_scan::AnalysisError>(())
/// ```
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    if bytes.is_empty() {
        return Err(AnalysisError::DecodeError {
            message: "Image data is empty".to_string(),
            source: None,
        });
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AnalysisError::decode("Failed to read image header", e))?;

    if reader.format().is_none() {
        return Err(AnalysisError::DecodeError {
            message: "Unrecognised image format".to_string(),
            source: None,
        });
    }

    let img = reader
        .decode()
        .map_err(|e| AnalysisError::decode("Failed to decode image", e))?;

    into_rgb(img)
}

/// Load an image file from disk and decode it to RGB
///
/// # Errors
///
/// Returns `AnalysisError::DecodeError` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| AnalysisError::decode(format!("Failed to open image file: {}", path.display()), e))?
        .with_guessed_format()
        .map_err(|e| AnalysisError::decode(format!("Failed to read image file: {}", path.display()), e))?;

    let img = reader
        .decode()
        .map_err(|e| AnalysisError::decode(format!("Failed to decode image: {}", path.display()), e))?;

    into_rgb(img)
}

fn into_rgb(img: image::DynamicImage) -> Result<RgbImage> {
    let rgb = img.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(AnalysisError::DecodeError {
            message: format!("Image has zero area ({}x{})", rgb.width(), rgb.height()),
            source: None,
        });
    }
    tracing::debug!("Decoded image: {}x{}", rgb.width(), rgb.height());
    Ok(rgb)
}
