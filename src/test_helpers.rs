//! Shared test utilities for the image-converter test suite.
//!
//! Synthetic image builders, encoders, and small filesystem helpers used by
//! the imaging, storage, and web tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let board = DynamicImage::ImageRgb8(checkerboard(32, 32, 4));
//! let path = write_image(tmp.path(), "board.png", &board);
//! assert!(pixel_variance(&board) > 0.0);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

// =========================================================================
// Image builders
// =========================================================================

/// A `width`×`height` image filled with one colour.
pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// Black and white squares of `cell` pixels. Maximum high-frequency content.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

// =========================================================================
// Encoding and files
// =========================================================================

/// Encode an image as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Save `img` as `dir/name` (format from the extension) and return the path.
pub fn write_image(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

/// Sorted file names directly inside `dir`. Empty if `dir` is missing.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

// =========================================================================
// Measurements
// =========================================================================

/// Population variance of all RGB sample values.
///
/// A proxy for high-frequency content: blurring must not increase it.
pub fn pixel_variance(img: &DynamicImage) -> f64 {
    let samples = img.to_rgb8().into_raw();
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    samples
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / n
}
