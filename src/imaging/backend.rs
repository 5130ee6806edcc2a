//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two pixel operations every backend
//! must support: grayscale and blur. Each reads its source from disk, writes
//! its result to the output path, and reports the output dimensions.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{BlurParams, GrayscaleParams, InvalidOperation};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
    #[error("{path} is not a readable image: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write image to {path}: {source}")]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Width and height of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Send + Sync` so a single backend can be shared behind an `Arc` by every
/// request handler and moved onto blocking worker threads.
pub trait ImageBackend: Send + Sync {
    /// Unweighted-mean grayscale, written as 3-channel RGB.
    fn grayscale(&self, params: &GrayscaleParams) -> Result<Dimensions, TransformError>;

    /// Gaussian blur, preserving the source's colour layout.
    fn blur(&self, params: &BlurParams) -> Result<Dimensions, TransformError>;
}
