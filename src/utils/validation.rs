use std::fs;
use std::path::Path;
use crate::{AudioError, Result, ValidationFailure};

const ALLOWED_EXTENSIONS: [&str; 6] = ["mp3", "wav", "m4a", "aac", "ogg", "flac"];

/// Upload checks run before a file is handed to the probe.
pub struct FileValidator {
    max_size_bytes: u64,
}

impl FileValidator {
    pub fn new(max_size_mb: u64) -> Self {
        Self {
            max_size_bytes: max_size_mb.saturating_mul(1024 * 1024),
        }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn validate_extension(&self, file_path: impl AsRef<Path>) -> bool {
        extension_of(file_path.as_ref())
            .map_or(false, |ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Size is read from disk on every call. A file that has vanished is an error.
    pub fn validate_size(&self, file_path: impl AsRef<Path>) -> Result<bool> {
        Ok(file_size(file_path.as_ref())? <= self.max_size_bytes)
    }

    /// Extension first, then size.
    pub fn validate(&self, file_path: impl AsRef<Path>) -> Result<()> {
        let file_path = file_path.as_ref();
        if !self.validate_extension(file_path) {
            return Err(ValidationFailure::UnsupportedFormat {
                extension: extension_of(file_path),
            }
            .into());
        }

        let size_bytes = file_size(file_path)?;
        if size_bytes > self.max_size_bytes {
            return Err(ValidationFailure::TooLarge {
                size_bytes,
                max_bytes: self.max_size_bytes,
            }
            .into());
        }
        Ok(())
    }
}

fn extension_of(file_path: &Path) -> Option<String> {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn file_size(file_path: &Path) -> Result<u64> {
    fs::metadata(file_path)
        .map(|m| m.len())
        .map_err(|e| AudioError::storage(file_path, e))
}
