//! High-level image operations.
//!
//! These functions turn an [`Operation`] into backend parameters and run
//! them. They are the Image Transform Engine's entry points.

use super::backend::{Dimensions, ImageBackend, TransformError};
use super::params::{BLUR_SIGMA, BlurParams, GrayscaleParams, Operation};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Summary of a completed transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transformed {
    pub operation: Operation,
    pub dimensions: Dimensions,
}

/// Plan a blur without executing it.
pub fn plan_blur(source: &Path, output: &Path) -> BlurParams {
    BlurParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        sigma: BLUR_SIGMA,
    }
}

/// Decode `source`, apply `operation`, and write the result to `output`.
///
/// The output format follows the extension of `output`. Nothing is retried;
/// any failure aborts the call.
pub fn transform(
    backend: &dyn ImageBackend,
    source: &Path,
    output: &Path,
    operation: Operation,
) -> Result<Transformed> {
    let dimensions = match operation {
        Operation::Grayscale => backend.grayscale(&GrayscaleParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
        })?,
        Operation::Blur => backend.blur(&plan_blur(source, output))?,
    };

    Ok(Transformed {
        operation,
        dimensions,
    })
}

/// Like [`transform`], but takes the operation by name.
///
/// Fails with [`TransformError::InvalidOperation`] before touching the
/// backend when `name` is not `grayscale` or `blur`.
pub fn transform_named(
    backend: &dyn ImageBackend,
    source: &Path,
    output: &Path,
    name: &str,
) -> Result<Transformed> {
    let operation: Operation = name.parse()?;
    transform(backend, source, output, operation)
}
