//! Binary mask helpers over `GrayImage`
//!
//! Foreground is 255, background 0. Morphology uses the L-infinity norm, so
//! radius `k` is a `(2k + 1) x (2k + 1)` square. Pixels outside the image
//! never contribute: erosion does not eat in from the border.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use imageproc::region_labelling::{connected_components, Connectivity};

pub const FOREGROUND: Luma<u8> = Luma([255]);
pub const BACKGROUND: Luma<u8> = Luma([0]);

/// Build a mask by evaluating a predicate at every pixel
pub fn mask_from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| if f(x, y) { FOREGROUND } else { BACKGROUND })
}

/// Close then open with a `kernel x kernel` square
pub fn clean_mask(mask: &GrayImage, kernel: usize) -> GrayImage {
    let radius = u8::try_from(kernel / 2).unwrap_or(u8::MAX);
    let closed = morphology::close(mask, Norm::LInf, radius);
    morphology::open(&closed, Norm::LInf, radius)
}

/// Number of foreground pixels
pub fn mask_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] > 0).count()
}

/// Foreground coordinates in row-major order
pub fn mask_pixels(mask: &GrayImage) -> impl Iterator<Item = (u32, u32)> + '_ {
    mask.enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0)
        .map(|(x, y, _)| (x, y))
}

/// Largest 8-connected component, or `None` for an empty mask.
///
/// Ties go to the lower label, i.e. the component met first in raster order.
pub fn largest_component(mask: &GrayImage) -> Option<GrayImage> {
    let labels = connected_components(mask, Connectivity::Eight, BACKGROUND);

    let mut sizes: BTreeMap<u32, usize> = BTreeMap::new();
    for p in labels.pixels().filter(|p| p[0] != 0) {
        *sizes.entry(p[0]).or_default() += 1;
    }
    let (&label, _) = sizes
        .iter()
        .max_by_key(|&(label, size)| (*size, Reverse(*label)))?;

    Some(mask_from_fn(mask.width(), mask.height(), |x, y| {
        labels.get_pixel(x, y)[0] == label
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_mask(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        mask_from_fn(w, h, |x, y| x >= x0 && x < x1 && y >= y0 && y < y1)
    }

    #[test]
    fn test_count_and_pixels() {
        let mask = rect_mask(10, 10, 2, 3, 5, 5);
        assert_eq!(mask_count(&mask), 6);
        let pts: Vec<_> = mask_pixels(&mask).collect();
        assert_eq!(pts[0], (2, 3));
        assert_eq!(pts[5], (4, 4));
    }

    #[test]
    fn test_interior_rect_survives_cleaning() {
        let mask = rect_mask(60, 60, 10, 10, 50, 50);
        assert_eq!(clean_mask(&mask, 5), mask);
    }

    #[test]
    fn test_cleaning_removes_specks() {
        let mut mask = rect_mask(60, 60, 10, 10, 50, 50);
        mask.put_pixel(4, 4, FOREGROUND);
        mask.put_pixel(55, 5, FOREGROUND);
        let cleaned = clean_mask(&mask, 5);
        assert_eq!(cleaned.get_pixel(4, 4), &BACKGROUND);
        assert_eq!(cleaned.get_pixel(55, 5), &BACKGROUND);
        assert_eq!(mask_count(&cleaned), 1600);
    }

    #[test]
    fn test_cleaning_fills_small_hole() {
        let mut mask = rect_mask(60, 60, 10, 10, 50, 50);
        mask.put_pixel(30, 30, BACKGROUND);
        mask.put_pixel(31, 30, BACKGROUND);
        assert_eq!(mask_count(&clean_mask(&mask, 5)), 1600);
    }

    #[test]
    fn test_border_patch_is_not_eroded_away() {
        let corner = rect_mask(40, 40, 0, 0, 10, 10);
        assert_eq!(clean_mask(&corner, 5), corner);
    }

    #[test]
    fn test_largest_component() {
        let mut mask = rect_mask(40, 40, 0, 0, 5, 5);
        for y in 20..30 {
            for x in 20..30 {
                mask.put_pixel(x, y, FOREGROUND);
            }
        }
        let largest = largest_component(&mask).unwrap();
        assert_eq!(mask_count(&largest), 100);
        assert_eq!(largest.get_pixel(25, 25), &FOREGROUND);
        assert_eq!(largest.get_pixel(1, 1), &BACKGROUND);
    }

    #[test]
    fn test_components_are_eight_connected() {
        let mut mask = GrayImage::new(5, 5);
        mask.put_pixel(0, 0, FOREGROUND);
        mask.put_pixel(1, 1, FOREGROUND);
        mask.put_pixel(2, 2, FOREGROUND);
        assert_eq!(mask_count(&largest_component(&mask).unwrap()), 3);
    }

    #[test]
    fn test_largest_component_of_empty_mask() {
        assert!(largest_component(&GrayImage::new(4, 4)).is_none());
    }
}
