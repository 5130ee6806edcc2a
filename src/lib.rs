//! # Image Converter
//!
//! A small web front-end for one-shot image transforms. Upload an image, pick
//! an operation, and get the original and the processed version side by side.
//!
//! # Request Flow
//!
//! ```text
//! POST /  (multipart: image + operation)
//!   → validate form        (nothing written on failure)
//!   → store upload         uploads/<hash>.<ext>
//!   → transform            static/processed_<hash>-<op>.<ext>
//!   → 303 /result?input_image=…&output_image=…&name=…
//! ```
//!
//! The transform runs on tokio's blocking pool so a large blur never stalls
//! other requests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Operations (`grayscale`, `blur`), the backend trait, and the pure-Rust backend |
//! | [`storage`] | Upload and result directories, content-hash file naming |
//! | [`config`] | `config.toml` loading with per-key defaults, validation |
//! | [`web`] | axum router, handlers, maud pages, error-to-response mapping |
//!
//! # Design Decisions
//!
//! ## Content-Hash File Names
//!
//! Uploads are stored under the first 16 hex digits of their SHA-256 plus an
//! extension. Client file names never reach the filesystem, so path
//! traversal and collisions between different uploads with the same name are
//! not possible. Re-uploading identical bytes reuses the stored file.
//! The original name only travels on the result URL, for display.
//!
//! Uploads and results are written to a temporary file and renamed into
//! place, so concurrent requests never read a partial file.
//!
//! ## Grayscale Is an Unweighted Mean
//!
//! Grayscale sets each channel to `(r + g + b) / 3`, truncated. This is not the
//! perceptual luma the `image` crate's `grayscale()` uses; see
//! [`imaging::calculations`].
//!
//! ## Errors Re-render the Form
//!
//! Every request failure renders the upload page again with an inline
//! message and a meaningful status code. A bad upload never takes the server
//! down. See [`web::AppError`].

pub mod config;
pub mod imaging;
pub mod storage;
pub mod web;

#[cfg(test)]
pub(crate) mod test_helpers;
