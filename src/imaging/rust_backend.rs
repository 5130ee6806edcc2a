//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (BMP, GIF, JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Grayscale | [`grayscale_mean`](super::calculations::grayscale_mean) on `to_rgb8()` |
//! | Blur | `image::DynamicImage::blur` (Gaussian, edge-clamped) |
//! | Encode | `image::DynamicImage::write_to` into a temp file, renamed over the output (format from output extension) |

use super::backend::{Dimensions, ImageBackend, TransformError};
use super::calculations::grayscale_mean;
use super::params::{BlurParams, GrayscaleParams};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Backend built on the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// The format is sniffed from the file contents first, so a mislabelled
/// extension still decodes.
fn load_image(path: &Path) -> Result<DynamicImage, TransformError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|source| TransformError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })
}

/// Save an image to `path`, inferring the format from its extension.
///
/// The image is encoded into a temporary file next to `path` and renamed into
/// place, so `path` is either absent or complete. A failed encode leaves
/// nothing behind.
fn save_image(img: &DynamicImage, path: &Path) -> Result<(), TransformError> {
    let encode_error = |source| TransformError::ImageEncode {
        path: path.to_path_buf(),
        source,
    };
    let format = ImageFormat::from_path(path).map_err(encode_error)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        img.write_to(&mut writer, format).map_err(encode_error)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn dimensions_of(img: &DynamicImage) -> Dimensions {
    let (width, height) = img.dimensions();
    Dimensions { width, height }
}

impl ImageBackend for RustBackend {
    fn grayscale(&self, params: &GrayscaleParams) -> Result<Dimensions, TransformError> {
        let img = load_image(&params.source)?;
        // Luma sources widen to R=G=B here, so their mean is the luma value.
        let gray = DynamicImage::ImageRgb8(grayscale_mean(&img.to_rgb8()));
        save_image(&gray, &params.output)?;
        Ok(dimensions_of(&gray))
    }

    fn blur(&self, params: &BlurParams) -> Result<Dimensions, TransformError> {
        let img = load_image(&params.source)?;
        let blurred = img.blur(params.sigma);
        save_image(&blurred, &params.output)?;
        Ok(dimensions_of(&blurred))
    }
}
