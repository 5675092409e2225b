//! Photo asset storage
//!
//! Uploaded photos live as flat files in the uploads directory and are
//! referenced by their public path (`/uploads/<file>`). An asset is owned
//! by exactly one profile record; create, replace, and delete are driven by
//! the directory API, this store only moves bytes.

use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Public URL prefix under which stored photos are served
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Maximum accepted photo payload (5 MiB)
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Declared content types accepted for photo uploads
const ACCEPTED_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

/// Asset store errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// Declared content type is not an accepted image format
    #[error("{0} (accepted: image/png, image/jpg, image/jpeg)")]
    UnsupportedMediaType(String),

    /// Payload exceeds the size limit
    #[error("photo is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Filesystem failure
    #[error("asset IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// File-backed store for uploaded photos
#[derive(Clone)]
pub struct AssetStore {
    upload_dir: PathBuf,
}

impl AssetStore {
    /// Open the store rooted at `upload_dir`, creating the directory if missing
    pub fn new(upload_dir: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self { upload_dir })
    }

    /// Directory holding the stored files, for static serving
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Store a photo payload and return its public `/uploads/...` path.
    ///
    /// The declared content type is checked before any bytes are written,
    /// and oversized payloads are rejected without a partial file. The
    /// generated file name (timestamp + random suffix + original extension)
    /// is collision-resistant across concurrent uploads, so a replacement
    /// photo always gets a fresh reference instead of overwriting in place.
    pub async fn put(
        &self,
        bytes: &[u8],
        declared_type: &str,
        original_name: Option<&str>,
    ) -> Result<String, AssetError> {
        if !ACCEPTED_TYPES.contains(&declared_type) {
            return Err(AssetError::UnsupportedMediaType(declared_type.to_string()));
        }
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(AssetError::TooLarge {
                size: bytes.len(),
                limit: MAX_PHOTO_BYTES,
            });
        }

        let file_name = generate_file_name(declared_type, original_name);
        let dest = self.upload_dir.join(&file_name);
        tokio::fs::write(&dest, bytes).await?;
        debug!("Stored photo asset: {}", dest.display());

        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    /// Delete a stored photo by its public path.
    ///
    /// Idempotent: deleting a missing asset (or a reference that does not
    /// point into the uploads namespace) is not an error.
    pub async fn delete(&self, public_path: &str) -> Result<(), AssetError> {
        let Some(path) = self.resolve(public_path) else {
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed photo asset: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AssetError::Io(e)),
        }
    }

    /// Absolute file path for a stored public reference.
    ///
    /// Returns `None` for references outside the uploads namespace or
    /// containing path separators, so a stored reference can never escape
    /// the uploads directory.
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let file_name = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return None;
        }
        Some(self.upload_dir.join(file_name))
    }
}

/// Generate a collision-resistant file name: `photo-<millis>-<random><ext>`
fn generate_file_name(declared_type: &str, original_name: Option<&str>) -> String {
    let ext = original_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| default_extension(declared_type).to_string());

    let timestamp = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("photo-{}-{:09}{}", timestamp, suffix, ext)
}

/// Fallback extension derived from the declared content type
fn default_extension(declared_type: &str) -> &'static str {
    match declared_type {
        "image/png" => ".png",
        _ => ".jpg",
    }
}
