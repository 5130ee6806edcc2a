//! Pure pixel math for the grayscale transform.
//!
//! Kept free of I/O so the exact averaging rule can be tested directly.
//! Grayscale here is the *unweighted* mean of R, G and B, truncated toward
//! zero. It is not perceptual luminance (`DynamicImage::grayscale` in the
//! `image` crate uses Rec. 709 weights) and the two give different values,
//! e.g. pure red is 85 here and 54 under luminance weighting.

use image::{Rgb, RgbImage};

/// Truncated arithmetic mean of three channel values.
pub fn channel_mean(r: u8, g: u8, b: u8) -> u8 {
    // max 765 / 3 = 255, always fits
    ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8
}

/// Replace every pixel with its channel mean on all three channels.
pub fn grayscale_mean(rgb: &RgbImage) -> RgbImage {
    RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
        let mean = channel_mean(r, g, b);
        Rgb([mean, mean, mean])
    })
}
