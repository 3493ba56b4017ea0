use std::path::PathBuf;
use serde::Serialize;

pub mod audio;
pub mod cli;
pub mod config;
pub mod services;
pub mod utils;

/// Technical metadata reported by the probe for one audio file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioMetadata {
    pub duration_seconds: f64,
    pub codec_name: Option<String>,
    pub bitrate_bps: Option<u64>,
    pub sample_rate_hz: Option<u64>,
    pub channels: Option<u64>,
}

impl AudioMetadata {
    /// Duration as `HH:MM:SS`, rounded to the nearest whole second (ties to even).
    pub fn duration_hms(&self) -> String {
        let total = self.duration_seconds.round_ties_even().max(0.0) as u64;
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Why an upload was turned away before probing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("Unsupported audio format")]
    UnsupportedFormat { extension: Option<String> },
    #[error("File is too large")]
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to remove project {}: {source}", .path.display())]
    Retention {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid project id: {0:?}")]
    InvalidProjectId(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AudioError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AudioError::Storage { path: path.into(), source }
    }

    pub(crate) fn retention(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AudioError::Retention { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, AudioError>;

// Re-exports for convenience
pub use audio::metadata::{parse_probe_output, FfprobeClient, MetadataProbe, ProbeError};
pub use config::Settings;
pub use services::cleanup::{ProjectInfo, RetentionService};
pub use services::ingest::{IngestPipeline, IngestReport};
pub use utils::file_ops::TempFileStorage;
pub use utils::validation::FileValidator;
