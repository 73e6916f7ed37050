//! Channel, sample and patch-colour types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{hsv_ranges, wavelengths};

/// One of the three camera channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Canonical wavelength for samples dominated by this channel
    pub fn peak_wavelength_nm(self) -> u32 {
        wavelengths::CHANNEL_PEAKS_NM[self.index()]
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Red => "R",
            Channel::Green => "G",
            Channel::Blue => "B",
        };
        f.write_str(name)
    }
}

/// Picks the largest of three values, preferring red, then green, on ties
fn argmax_channel<T: PartialOrd>(r: T, g: T, b: T) -> Channel {
    if r >= g && r >= b {
        Channel::Red
    } else if g >= b {
        Channel::Green
    } else {
        Channel::Blue
    }
}

/// 8-bit RGB sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn get(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }

    /// Channel with the largest value (ties resolve R, then G)
    pub fn dominant_channel(&self) -> Channel {
        argmax_channel(self.r, self.g, self.b)
    }

    pub fn to_values(self) -> ChannelValues {
        ChannelValues::new(self.r as f64, self.g as f64, self.b as f64)
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(px: [u8; 3]) -> Self {
        Self::new(px[0], px[1], px[2])
    }
}

/// Floating point per-channel triple
///
/// Used for baselines, corrected intensities, normalised intensities and
/// correction factors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelValues {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ChannelValues {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const fn splat(v: f64) -> Self {
        Self { r: v, g: v, b: v }
    }

    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }

    pub fn set(&mut self, channel: Channel, value: f64) {
        match channel {
            Channel::Red => self.r = value,
            Channel::Green => self.g = value,
            Channel::Blue => self.b = value,
        }
    }

    /// Build a triple by evaluating `f` once per channel
    pub fn from_fn(mut f: impl FnMut(Channel) -> f64) -> Self {
        Self::new(f(Channel::Red), f(Channel::Green), f(Channel::Blue))
    }

    pub fn map(self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    pub fn dominant_channel(&self) -> Channel {
        argmax_channel(self.r, self.g, self.b)
    }

    pub fn mean(&self) -> f64 {
        (self.r + self.g + self.b) / 3.0
    }
}

/// The six printed reference patches of the calibration chart
///
/// Declaration order is the detection order and the map-key order of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchColor {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
}

impl PatchColor {
    pub const ALL: [PatchColor; 6] = [
        PatchColor::Red,
        PatchColor::Yellow,
        PatchColor::Green,
        PatchColor::Cyan,
        PatchColor::Blue,
        PatchColor::Magenta,
    ];

    pub fn wavelength_nm(self) -> u32 {
        match self {
            PatchColor::Red => wavelengths::RED_NM,
            PatchColor::Yellow => wavelengths::YELLOW_NM,
            PatchColor::Green => wavelengths::GREEN_NM,
            PatchColor::Cyan => wavelengths::CYAN_NM,
            PatchColor::Blue => wavelengths::BLUE_NM,
            PatchColor::Magenta => wavelengths::MAGENTA_NM,
        }
    }

    pub fn hsv_ranges(self) -> &'static [hsv_ranges::HsvBounds] {
        match self {
            PatchColor::Red => hsv_ranges::RED,
            PatchColor::Yellow => hsv_ranges::YELLOW,
            PatchColor::Green => hsv_ranges::GREEN,
            PatchColor::Cyan => hsv_ranges::CYAN,
            PatchColor::Blue => hsv_ranges::BLUE,
            PatchColor::Magenta => hsv_ranges::MAGENTA,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PatchColor::Red => "red",
            PatchColor::Yellow => "yellow",
            PatchColor::Green => "green",
            PatchColor::Cyan => "cyan",
            PatchColor::Blue => "blue",
            PatchColor::Magenta => "magenta",
        }
    }
}

impl fmt::Display for PatchColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
