use std::fs;
use std::path::{Path, PathBuf};
use log::{info, warn};
use serde::Serialize;
use crate::audio::metadata::MetadataProbe;
use crate::utils::file_ops::TempFileStorage;
use crate::utils::validation::FileValidator;
use crate::{AudioError, AudioMetadata, Result};

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub original_name: String,
    pub stored_path: PathBuf,
    pub extension: Option<String>,
    pub size_bytes: u64,
    pub metadata: AudioMetadata,
}

/// Upload flow: store, validate, probe.
pub struct IngestPipeline<P> {
    storage: TempFileStorage,
    validator: FileValidator,
    probe: P,
}

impl<P: MetadataProbe> IngestPipeline<P> {
    pub fn new(storage: TempFileStorage, validator: FileValidator, probe: P) -> Self {
        Self {
            storage,
            validator,
            probe,
        }
    }

    pub fn storage(&self) -> &TempFileStorage {
        &self.storage
    }

    pub fn probe_available(&self) -> bool {
        self.probe.is_available()
    }

    /// Store an upload, validate it and read its metadata.
    ///
    /// Rejected uploads are removed from the scratch directory. Uploads the
    /// probe cannot read stay in place so they can be inspected or retried.
    pub fn ingest(&self, filename: &str, content: &[u8]) -> Result<IngestReport> {
        let file_path = self.storage.save(filename, content)?;

        if let Err(e) = self.validator.validate(&file_path) {
            warn!("Rejected upload {}: {}", filename, e);
            self.storage.discard(&file_path)?;
            return Err(e);
        }

        let metadata = self.probe.read_metadata(&file_path)?;
        let size_bytes = fs::metadata(&file_path)
            .map_err(|e| AudioError::storage(&file_path, e))?
            .len();

        info!(
            "Ingested {} as {} ({} bytes, {})",
            filename,
            file_path.display(),
            size_bytes,
            metadata.duration_hms()
        );

        Ok(IngestReport {
            original_name: filename.to_string(),
            extension: file_path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned()),
            stored_path: file_path,
            size_bytes,
            metadata,
        })
    }

    /// Ingest a file that already exists on the local filesystem.
    pub fn ingest_file(&self, source: impl AsRef<Path>) -> Result<IngestReport> {
        let source = source.as_ref();
        let content = fs::read(source).map_err(|e| AudioError::storage(source, e))?;
        let filename = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ingest(&filename, &content)
    }

    pub fn clear_temp(&self) -> Result<usize> {
        self.storage.clear()
    }
}
