//! Calibration constants and reference values for spectral calibration
//!
//! This module contains compile-time constants for patch detection and
//! correction. HSV values use the 8-bit convention common to camera
//! pipelines: hue in `[0, 180]`, saturation and value in `[0, 255]`.

/// Calibration chart wavelengths in nanometres
pub mod wavelengths {
    pub const RED_NM: u32 = 625;
    pub const YELLOW_NM: u32 = 580;
    pub const GREEN_NM: u32 = 530;
    pub const CYAN_NM: u32 = 490;
    pub const BLUE_NM: u32 = 460;
    pub const MAGENTA_NM: u32 = 570;

    /// Canonical wavelength per RGB channel used to estimate a sample's
    /// dominant wavelength
    pub const CHANNEL_PEAKS_NM: [u32; 3] = [RED_NM, GREEN_NM, BLUE_NM];
}

/// HSV threshold ranges per patch colour
pub mod hsv_ranges {
    /// Inclusive `(lower, upper)` bounds as `[h, s, v]`
    pub type HsvBounds = ([u8; 3], [u8; 3]);

    // Red wraps around the hue circle.
    pub const RED: &[HsvBounds] = &[
        ([0, 100, 100], [10, 255, 255]),
        ([170, 100, 100], [180, 255, 255]),
    ];
    pub const YELLOW: &[HsvBounds] = &[([20, 100, 100], [30, 255, 255])];
    pub const GREEN: &[HsvBounds] = &[([40, 50, 50], [80, 255, 255])];
    pub const CYAN: &[HsvBounds] = &[([80, 50, 50], [100, 255, 255])];
    pub const BLUE: &[HsvBounds] = &[([100, 100, 100], [130, 255, 255])];
    pub const MAGENTA: &[HsvBounds] = &[([140, 50, 100], [170, 255, 255])];
}

/// Region detection parameters
pub mod detection {
    /// Masks with fewer pixels than this are treated as noise
    pub const MIN_REGION_PIXELS: usize = 100;

    /// Side of the square structuring element used for close/open
    pub const MORPH_KERNEL_SIZE: usize = 5;

    /// Corner crop size as a fraction of image width and height
    pub const CORNER_FRACTION: f64 = 0.1;

    /// Number of dark corner regions sampled per image
    pub const NUM_CORNERS: usize = 4;
}

/// Correction curve parameters
pub mod correction {
    /// Minimum number of patches required to calibrate
    pub const MIN_COLORS_FOR_CALIBRATION: usize = 4;

    /// Hard clip bounds on every correction factor
    pub const FACTOR_MIN: f64 = 0.1;
    pub const FACTOR_MAX: f64 = 10.0;

    /// Floor on normalised intensity when dividing into the reference
    pub const NORMALIZATION_FLOOR: f64 = 0.01;

    /// Degree of the display-only smoothing polynomial
    pub const DISPLAY_POLYNOMIAL_DEGREE: usize = 3;

    /// Factors at or above this on all channels mark an unreliable calibration
    pub const UNRELIABLE_FACTOR_THRESHOLD: f64 = 9.0;

    /// Version tag written into persisted calibration results
    pub const CALIBRATION_SCHEMA_VERSION: u32 = 1;
}

/// Reference response table
///
/// Ideal normalised `[r, g, b]` response at each calibration wavelength.
/// Domain knowledge, not derived from measurements.
pub mod reference {
    pub const RESPONSES: [(u32, [f64; 3]); 6] = [
        (460, [0.2, 0.3, 1.0]),
        (490, [0.1, 0.6, 1.0]),
        (530, [0.3, 1.0, 0.4]),
        (570, [0.3, 0.6, 0.3]),
        (580, [1.0, 0.6, 0.3]),
        (625, [1.0, 0.2, 0.1]),
    ];

    /// Response used for wavelengths absent from the table
    pub const NEUTRAL_RESPONSE: [f64; 3] = [1.0, 1.0, 1.0];
}
