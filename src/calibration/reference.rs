//! Ideal per-channel response at each calibration wavelength

use crate::color::ChannelValues;
use crate::constants::reference::{NEUTRAL_RESPONSE, RESPONSES};

/// Static lookup of the normalised response a spectrally flat camera would
/// record for each calibration wavelength
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceResponseTable;

impl ReferenceResponseTable {
    pub fn new() -> Self {
        Self
    }

    /// Reference response, or the neutral response if the wavelength is not tabulated
    pub fn response(&self, wavelength_nm: u32) -> ChannelValues {
        ChannelValues::from_array(self.lookup(wavelength_nm).unwrap_or(NEUTRAL_RESPONSE))
    }

    /// Whether the wavelength has a tabulated response
    pub fn contains(&self, wavelength_nm: u32) -> bool {
        self.lookup(wavelength_nm).is_some()
    }

    /// Tabulated wavelengths, ascending
    pub fn wavelengths(&self) -> impl Iterator<Item = u32> {
        RESPONSES.iter().map(|(wl, _)| *wl)
    }

    fn lookup(&self, wavelength_nm: u32) -> Option<[f64; 3]> {
        RESPONSES
            .binary_search_by_key(&wavelength_nm, |(wl, _)| *wl)
            .ok()
            .map(|i| RESPONSES[i].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PatchColor;

    #[test]
    fn test_every_patch_has_a_reference() {
        let table = ReferenceResponseTable::new();
        for color in PatchColor::ALL {
            assert!(table.contains(color.wavelength_nm()), "{}", color);
        }
    }

    #[test]
    fn test_known_responses() {
        let table = ReferenceResponseTable::new();
        assert_eq!(table.response(625), ChannelValues::new(1.0, 0.2, 0.1));
        assert_eq!(table.response(570), ChannelValues::new(0.3, 0.6, 0.3));
        assert_eq!(table.response(460), ChannelValues::new(0.2, 0.3, 1.0));
    }

    #[test]
    fn test_unknown_wavelength_is_neutral() {
        let table = ReferenceResponseTable::new();
        assert_eq!(table.response(700), ChannelValues::splat(1.0));
        assert!(!table.contains(700));
    }
}
