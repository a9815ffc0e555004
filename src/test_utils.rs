//! Test utilities for imageops-expand
//!
//! This module provides common functionality for testing image operations.
//! It is only compiled when running tests.

use crate::Image;
use image::Rgba;

/// Creates an RGBA image where every pixel has the same color.
///
/// # Arguments
/// * `width` - Width of the image to create
/// * `height` - Height of the image to create
/// * `color` - Fill color
///
/// # Returns
/// An RGBA image with u8 subpixels
pub fn create_solid_image(width: u32, height: u32, color: Rgba<u8>) -> Image<Rgba<u8>> {
    Image::from_pixel(width, height, color)
}

/// Creates an RGBA image whose pixels are all distinct for small sizes.
///
/// Red grows along x, green along y, blue mixes both and alpha cycles,
/// so misplaced pixels show up in comparisons.
///
/// # Returns
/// An RGBA image with u8 subpixels
pub fn create_gradient_rgba_image(width: u32, height: u32) -> Image<Rgba<u8>> {
    Image::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x * 7 + y * 13) % 256) as u8,
            (128 + (x + y) % 128) as u8,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_solid_image_fills_every_pixel() {
        let color = Rgba([1, 2, 3, 4]);
        let image = create_solid_image(3, 2, color);
        assert_eq!(image.dimensions(), (3, 2));
        assert!(image.pixels().all(|p| *p == color));
    }

    #[test]
    fn create_gradient_rgba_image_has_distinct_pixels() {
        let image = create_gradient_rgba_image(6, 4);
        let mut pixels: Vec<[u8; 4]> = image.pixels().map(|p| p.0).collect();
        pixels.sort_unstable();
        pixels.dedup();
        assert_eq!(pixels.len(), 24);
    }
}
