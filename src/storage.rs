//! File storage under a single root directory.
//!
//! Every path handed in or out is storage-relative with `/` separators
//! (`photos/employee_<hex>.jpg`, `generated/ttn/<name>.docx`). The
//! implementations are blocking; handlers call them inside `web::block`.

use chrono::Local;
use log::{debug, error, info, warn};
use sanitize_filename::sanitize;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use thiserror::Error;
use uuid::Uuid;

pub const TEMPLATES_DIR: &str = "templates";
pub const PHOTOS_DIR: &str = "photos";
pub const DOCUMENTS_DIR: &str = "documents";
pub const GENERATED_DIR: &str = "generated";
pub const TESTS_DIR: &str = "tests";

const PHOTO_MAX_SIDE: u32 = 800;
const PHOTO_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage path: {0}")]
    InvalidPath(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blocking file store addressed by storage-relative paths.
///
/// Implementors provide the primitives; the `save_*` helpers build the
/// directory layout on top of them.
pub trait FileStorage: Send + Sync {
    /// Maps a storage-relative path to an absolute one, refusing anything that
    /// could escape the root.
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError>;

    /// Writes `bytes` at `relative`, creating parent directories. A failed
    /// write must not leave a partial file behind.
    fn write(&self, relative: &str, bytes: &[u8]) -> Result<(), StorageError>;

    fn read(&self, relative: &str) -> Result<Vec<u8>, StorageError>;

    /// Returns `false` when there was nothing to delete.
    fn delete_file(&self, relative: &str) -> Result<bool, StorageError>;

    /// Size in bytes, 0 when the file is absent.
    fn file_size(&self, relative: &str) -> u64;

    /// Removes files under `relative_dir` older than `max_age_days`.
    fn cleanup_old_files(&self, relative_dir: &str, max_age_days: u64)
        -> Result<usize, StorageError>;

    fn save_employee_photo(&self, bytes: &[u8], original_name: &str) -> Result<String, StorageError> {
        let token = Uuid::new_v4().simple().to_string();
        let (body, ext) = match optimize_photo(bytes) {
            Ok(jpeg) => (jpeg, ".jpg".to_string()),
            Err(e) => {
                warn!("Photo optimisation failed, keeping original bytes: {}", e);
                (bytes.to_vec(), extension_of(original_name))
            }
        };
        let relative = format!("{}/employee_{}{}", PHOTOS_DIR, token, ext);
        self.write(&relative, &body)?;
        info!("Saved employee photo {}", relative);
        Ok(relative)
    }

    fn save_document(
        &self,
        bytes: &[u8],
        original_name: &str,
        document_type: &str,
    ) -> Result<String, StorageError> {
        let filename = sanitize(original_name);
        if filename.is_empty() {
            return Err(StorageError::InvalidPath(original_name.to_string()));
        }
        let relative = format!("{}/{}/{}", DOCUMENTS_DIR, segment(document_type)?, filename);
        self.write(&relative, bytes)?;
        info!("Saved document {}", relative);
        Ok(relative)
    }

    /// Scanned personal document of an employee, stamped with the upload time:
    /// `documents/employee_<id>_<YYYYmmdd_HHMMSS>_<name>`.
    fn save_employee_document(
        &self,
        bytes: &[u8],
        employee_id: i64,
        original_name: &str,
    ) -> Result<String, StorageError> {
        let relative = format!(
            "{}/employee_{}_{}_{}",
            DOCUMENTS_DIR,
            employee_id,
            Local::now().format("%Y%m%d_%H%M%S"),
            segment(original_name)?
        );
        self.write(&relative, bytes)?;
        info!("Saved document {} for employee {}", relative, employee_id);
        Ok(relative)
    }

    fn save_template(
        &self,
        bytes: &[u8],
        original_name: &str,
        template_type: &str,
    ) -> Result<String, StorageError> {
        let relative = format!(
            "{}/{}_{}{}",
            TEMPLATES_DIR,
            segment(template_type)?,
            Uuid::new_v4().simple(),
            extension_of(original_name)
        );
        self.write(&relative, bytes)?;
        info!("Saved template {}", relative);
        Ok(relative)
    }

    fn save_generated_document(
        &self,
        bytes: &[u8],
        filename: &str,
        document_type: &str,
    ) -> Result<String, StorageError> {
        let relative = format!(
            "{}/{}/{}",
            GENERATED_DIR,
            segment(document_type)?,
            segment(filename)?
        );
        self.write(&relative, bytes)?;
        info!("Saved generated document {}", relative);
        Ok(relative)
    }
}

/// Storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the top-level directories the application writes into.
    pub fn ensure_layout(&self) -> Result<(), StorageError> {
        for dir in [TEMPLATES_DIR, PHOTOS_DIR, DOCUMENTS_DIR, GENERATED_DIR, TESTS_DIR] {
            fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }
}

impl FileStorage for LocalStorage {
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let path = Path::new(relative);
        if relative.is_empty() {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(StorageError::InvalidPath(relative.to_string())),
            }
        }
        Ok(self.root.join(path))
    }

    fn write(&self, relative: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve(relative)?;
        let parent = target
            .parent()
            .ok_or_else(|| StorageError::InvalidPath(relative.to_string()))?;
        fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(bytes)?;
        temp.flush()?;
        temp.persist(&target).map_err(|e| StorageError::Io(e.error))?;
        debug!("Wrote {} bytes to {}", bytes.len(), target.display());
        Ok(())
    }

    fn read(&self, relative: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(relative)?;
        fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(relative.to_string()),
            _ => StorageError::Io(e),
        })
    }

    fn delete_file(&self, relative: &str) -> Result<bool, StorageError> {
        let path = self.resolve(relative)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted {}", relative);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn file_size(&self, relative: &str) -> u64 {
        self.resolve(relative)
            .ok()
            .and_then(|path| fs::metadata(path).ok())
            .map(|meta| meta.len())
            .unwrap_or(0)
    }

    fn cleanup_old_files(
        &self,
        relative_dir: &str,
        max_age_days: u64,
    ) -> Result<usize, StorageError> {
        let dir = if relative_dir.is_empty() || relative_dir == "." {
            self.root.clone()
        } else {
            self.resolve(relative_dir)?
        };
        if !dir.exists() {
            return Ok(0);
        }
        let max_age = Duration::from_secs(max_age_days.saturating_mul(24 * 60 * 60));
        let now = SystemTime::now();
        let removed = remove_older_than(&dir, now, max_age)?;
        info!("Removed {} files older than {} days from {}", removed, max_age_days, dir.display());
        Ok(removed)
    }
}

fn remove_older_than(dir: &Path, now: SystemTime, max_age: Duration) -> Result<usize, StorageError> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let meta = entry.metadata()?;
        if meta.is_dir() {
            removed += remove_older_than(&path, now, max_age)?;
            continue;
        }
        let modified = meta.modified()?;
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed old file {}", path.display());
                    removed += 1;
                }
                Err(e) => error!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
    Ok(removed)
}

/// Shrinks a photo into an 800x800 box and re-encodes it as JPEG.
pub fn optimize_photo(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let img = if img.width() > PHOTO_MAX_SIDE || img.height() > PHOTO_MAX_SIDE {
        img.resize(PHOTO_MAX_SIDE, PHOTO_MAX_SIDE, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };
    let rgb = img.to_rgb8();

    let mut out = Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, PHOTO_JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;
    Ok(out.into_inner())
}

/// Lower-cased extension with its leading dot, or an empty string.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(|ext| format!(".{}", sanitize(ext).to_lowercase()))
        .unwrap_or_default()
}

/// A single sanitized path segment; rejects values that sanitize to nothing.
fn segment(value: &str) -> Result<String, StorageError> {
    let cleaned = sanitize(value);
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        Err(StorageError::InvalidPath(value.to_string()))
    } else {
        Ok(cleaned)
    }
}
