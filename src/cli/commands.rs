use clap::{Parser, Subcommand};
use std::path::PathBuf;
use crate::config::Settings;

/// Hours a project is kept by default (one week).
pub const DEFAULT_TTL_HOURS: i64 = 168;
/// Longest TTL accepted from the command line (one year).
pub const MAX_TTL_HOURS: i64 = 24 * 365;

#[derive(Parser)]
#[command(name = "audio-splitter")]
#[command(version)]
#[command(about = "Audio upload inspection and project retention", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store, validate and inspect an audio file
    Ingest {
        /// Audio file to upload
        file: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove all temporary uploads
    ClearTemp,

    /// Check whether ffprobe can be run
    CheckProbe,

    /// Delete a single project and its files
    DeleteProject {
        /// Project id (directory name under the projects root)
        project_id: String,
    },

    /// Delete every project
    DeleteAll,

    /// Delete projects older than a TTL
    Cleanup {
        /// Age in hours at which a project is deleted
        #[arg(
            long,
            default_value_t = DEFAULT_TTL_HOURS,
            value_parser = clap::value_parser!(i64).range(1..=MAX_TTL_HOURS)
        )]
        older_than_hours: i64,
    },

    /// List projects with their age and size
    Projects {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}
