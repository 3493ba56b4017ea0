use std::path::PathBuf;
use clap::Args;

/// Runtime settings, taken from flags or `AUDIO_SPLITTER_*` environment variables.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Root directory holding the scratch area and project directories
    #[arg(long, global = true, env = "AUDIO_SPLITTER_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Largest accepted upload, in megabytes
    #[arg(long, global = true, env = "AUDIO_SPLITTER_MAX_UPLOAD_MB", default_value_t = 200)]
    pub max_upload_mb: u64,

    /// ffprobe executable name or path
    #[arg(long, global = true, env = "AUDIO_SPLITTER_FFPROBE", default_value = "ffprobe")]
    pub ffprobe: PathBuf,
}

impl Settings {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_upload_mb: 200,
            ffprobe: PathBuf::from("ffprobe"),
        }
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }

    pub fn projects_root(&self) -> PathBuf {
        self.data_dir.join("projects")
    }
}
