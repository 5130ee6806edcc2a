//! Image Transform Engine: decode, transform, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Grayscale** | unweighted channel mean ([`calculations`]) |
//! | **Blur** | `image::DynamicImage::blur`, sigma [`BLUR_SIGMA`] |
//! | **Encode** | `image` crate, format from output extension |
//!
//! The module is split into:
//! - **Calculations**: Pure pixel math (unit testable)
//! - **Parameters**: [`Operation`] and the structs describing each call
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`transform`] / [`transform_named`], dispatching an operation to a backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, ImageBackend, TransformError};
pub use operations::{Transformed, transform, transform_named};
pub use params::{BLUR_SIGMA, BlurParams, GrayscaleParams, InvalidOperation, Operation};
pub use rust_backend::RustBackend;
