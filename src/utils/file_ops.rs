use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use log::{debug, info};
use uuid::Uuid;
use crate::{AudioError, Result};

const FALLBACK_NAME: &str = "upload";

/// Scratch directory for uploads waiting to be validated and probed.
pub struct TempFileStorage {
    base_dir: PathBuf,
}

impl TempFileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|e| AudioError::storage(&base_dir, e))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Store `content` under `<uuid>_<basename of filename>` and return the new path.
    ///
    /// Only the last component of the client-supplied name is kept, so the
    /// result always lands directly inside the scratch directory.
    pub fn save(&self, filename: &str, content: &[u8]) -> Result<PathBuf> {
        let safe_name = format!("{}_{}", Uuid::new_v4().simple(), sanitize_file_name(filename));
        let file_path = self.base_dir.join(safe_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .map_err(|e| AudioError::storage(&file_path, e))?;
        file.write_all(content)
            .map_err(|e| AudioError::storage(&file_path, e))?;

        debug!("Saved {} bytes to {}", content.len(), file_path.display());
        Ok(file_path)
    }

    /// Remove a single stored file. Missing files are ignored.
    pub fn discard(&self, file_path: impl AsRef<Path>) -> Result<()> {
        let file_path = file_path.as_ref();
        match fs::remove_file(file_path) {
            Ok(()) => {
                debug!("Discarded {}", file_path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AudioError::storage(file_path, e)),
        }
    }

    /// Remove every regular file directly inside the scratch directory.
    ///
    /// Subdirectories are left alone. Returns how many files were removed.
    pub fn clear(&self) -> Result<usize> {
        let entries = fs::read_dir(&self.base_dir)
            .map_err(|e| AudioError::storage(&self.base_dir, e))?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| AudioError::storage(&self.base_dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                // Someone else got there first.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(AudioError::storage(&path, e)),
            }
        }

        info!("Cleared {} temporary files from {}", removed, self.base_dir.display());
        Ok(removed)
    }
}

fn sanitize_file_name(filename: &str) -> String {
    // Treat both separators as separators regardless of platform.
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => FALLBACK_NAME.to_string(),
        name => name.to_string(),
    }
}
