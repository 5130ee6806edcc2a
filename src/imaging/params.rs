//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides which transform a request needs) and the
//! [`backend`](super::backend) (which does the actual pixel work). This split
//! lets tests swap in a recording mock backend without touching the dispatch
//! logic.
//!
//! ## Types
//!
//! - [`Operation`]: the closed set of transforms, `grayscale` or `blur`.
//! - [`GrayscaleParams`]: source and output path for an unweighted-mean grayscale.
//! - [`BlurParams`]: source, output and Gaussian standard deviation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Standard deviation of the Gaussian kernel used by [`Operation::Blur`].
///
/// Matches a "radius 10" Gaussian blur; kernel size is derived from it by the
/// `image` crate.
pub const BLUR_SIGMA: f32 = 10.0;

/// A transform the engine knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Replace R, G and B with their truncated arithmetic mean.
    Grayscale,
    /// Gaussian blur with [`BLUR_SIGMA`].
    Blur,
}

impl Operation {
    /// Every operation, in the order the upload form offers them.
    pub const ALL: [Operation; 2] = [Operation::Grayscale, Operation::Blur];

    /// Wire name used in forms, URLs and file names.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Grayscale => "grayscale",
            Operation::Blur => "blur",
        }
    }

    /// Human-readable label for the upload form.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Grayscale => "Grayscale",
            Operation::Blur => "Gaussian blur",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation name outside the supported set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid operation '{0}': expected one of grayscale, blur")]
pub struct InvalidOperation(pub String);

impl FromStr for Operation {
    type Err = InvalidOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| InvalidOperation(s.to_string()))
    }
}

/// Parameters for a grayscale operation.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayscaleParams {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Parameters for a Gaussian blur operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BlurParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub sigma: f32,
}
