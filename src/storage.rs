//! Upload and result storage.
//!
//! Two flat directories: raw uploads and processed results. Both are plain
//! directories on disk with no metadata sidecar and no cleanup policy.
//!
//! ## Storage keys
//!
//! Uploads are **content-addressed**: the file name is the first
//! [`KEY_HEX_LEN`] hex digits of the SHA-256 of the uploaded bytes, plus an
//! extension. The client's file name is never used as a path component; it
//! is kept only as display metadata on [`StoredUpload`]. Two uploads of the
//! same bytes share one file, and different bytes do not collide.
//!
//! The extension comes from the first of:
//! 1. the format sniffed from the bytes (`image::guess_format`),
//! 2. the client file name's extension, if short and ASCII alphanumeric,
//! 3. `bin`.
//!
//! Results are named from the upload key and the operation, see
//! [`result_name`].

use crate::imaging::Operation;
use sha2::{Digest, Sha256};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::fs;

/// Hex digits of the content hash kept in a storage key.
pub const KEY_HEX_LEN: usize = 16;

const FALLBACK_EXTENSION: &str = "bin";

/// An upload written to the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// File name inside the uploads directory.
    pub key: String,
    /// Name the client sent, for display only.
    pub original_name: String,
    /// Whether this call wrote the file. `false` when identical bytes were
    /// already stored.
    pub created: bool,
}

/// Handle to the upload and result directories.
#[derive(Debug, Clone)]
pub struct Storage {
    upload_dir: Arc<PathBuf>,
    result_dir: Arc<PathBuf>,
}

impl Storage {
    /// Open storage rooted at the given directories, creating them if missing.
    pub async fn open(
        upload_dir: impl Into<PathBuf>,
        result_dir: impl Into<PathBuf>,
    ) -> io::Result<Self> {
        let upload_dir = upload_dir.into();
        let result_dir = result_dir.into();
        fs::create_dir_all(&upload_dir).await?;
        fs::create_dir_all(&result_dir).await?;
        Ok(Self {
            upload_dir: Arc::new(upload_dir),
            result_dir: Arc::new(result_dir),
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    pub fn upload_path(&self, key: &str) -> PathBuf {
        self.upload_dir.join(key)
    }

    pub fn result_path(&self, name: &str) -> PathBuf {
        self.result_dir.join(name)
    }

    /// Write `bytes` to the uploads directory under their storage key.
    ///
    /// The file appears atomically: bytes go to a temporary file in the same
    /// directory which is then renamed over the key. An existing file with
    /// the same key already holds these bytes and is left untouched, so
    /// concurrent readers never see a partial upload.
    pub async fn store_upload(&self, original_name: &str, bytes: &[u8]) -> io::Result<StoredUpload> {
        let key = storage_key(original_name, bytes);
        let path = self.upload_path(&key);
        let created = if fs::try_exists(&path).await? {
            false
        } else {
            let dir = Arc::clone(&self.upload_dir);
            let bytes = bytes.to_vec();
            tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &bytes))
                .await
                .map_err(io::Error::other)??;
            true
        };
        Ok(StoredUpload {
            key,
            original_name: original_name.to_string(),
            created,
        })
    }

    /// Remove an upload. A file that is already gone is not an error.
    pub async fn discard_upload(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.upload_path(key)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Write `bytes` to `path` via a temporary file in `dir` and a rename.
fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Content-derived file name for an upload.
pub fn storage_key(original_name: &str, bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    let extension = sniffed_extension(bytes)
        .map(str::to_string)
        .or_else(|| client_extension(original_name))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    format!("{}.{}", &digest[..KEY_HEX_LEN], extension)
}

/// Name of the processed file for an upload key and operation.
///
/// `3f2a….png` + blur → `processed_3f2a…-blur.png`. The extension is kept so
/// the result is encoded in the upload's format.
pub fn result_name(key: &str, operation: Operation) -> String {
    match key.rsplit_once('.') {
        Some((stem, ext)) => format!("processed_{stem}-{operation}.{ext}"),
        None => format!("processed_{key}-{operation}"),
    }
}

fn sniffed_extension(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
}

fn client_extension(original_name: &str) -> Option<String> {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
}
