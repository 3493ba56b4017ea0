use std::error::Error;
use clap::Parser;
use audio_splitter::{
    cli::commands::{Cli, Commands},
    utils::reporting::Reporter,
    AudioError, FfprobeClient, FileValidator, IngestPipeline, MetadataProbe, RetentionService,
    Settings, TempFileStorage,
};

const PROBE_MISSING: &str = "ffprobe is not available. Install FFmpeg to enable audio inspection.";

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let settings = cli.settings;

    let code = match run(&settings, cli.command) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    std::process::exit(code);
}

fn run(settings: &Settings, command: Commands) -> Result<(), Box<dyn Error>> {
    let reporter = Reporter::new();

    match command {
        Commands::Ingest { file, json } => {
            let pipeline = pipeline(settings)?;
            if !pipeline.probe_available() {
                return Err(PROBE_MISSING.into());
            }

            let report = pipeline.ingest_file(&file)?;
            let output = if json {
                reporter.ingest_json(&report)?
            } else {
                reporter.ingest_summary(&report)
            };
            println!("{}", output);
        }

        Commands::ClearTemp => {
            let storage = TempFileStorage::new(settings.temp_dir())?;
            let removed = storage.clear()?;
            println!("Temporary files cleared ({} removed)", removed);
        }

        Commands::CheckProbe => {
            let probe = FfprobeClient::with_executable(&settings.ffprobe);
            if !probe.is_available() {
                return Err(PROBE_MISSING.into());
            }
            println!("ffprobe is available: {}", probe.executable().to_string_lossy());
        }

        Commands::DeleteProject { project_id } => {
            let service = RetentionService::new(settings.projects_root());
            if !service.project_exists(&project_id)? {
                return Err("Project not found".into());
            }
            service.delete_project(&project_id)?;
            println!("Deleted project {}", project_id);
        }

        Commands::DeleteAll => {
            let service = RetentionService::new(settings.projects_root());
            let deleted = service.delete_all_projects()?;
            println!("All projects deleted ({} removed)", deleted);
        }

        Commands::Cleanup { older_than_hours } => {
            let service = RetentionService::new(settings.projects_root());
            let deleted = service.delete_projects_older_than_hours(older_than_hours)?;
            println!("Deleted {} projects older than {}h", deleted, older_than_hours);
        }

        Commands::Projects { json } => {
            let service = RetentionService::new(settings.projects_root());
            let projects = service.list_projects()?;
            let output = if json {
                reporter.projects_json(&projects)?
            } else {
                reporter.projects_table(&projects)
            };
            println!("{}", output);
        }
    }

    Ok(())
}

fn pipeline(settings: &Settings) -> Result<IngestPipeline<FfprobeClient>, AudioError> {
    let storage = TempFileStorage::new(settings.temp_dir())?;
    let validator = FileValidator::new(settings.max_upload_mb);
    let probe = FfprobeClient::with_executable(&settings.ffprobe);
    Ok(IngestPipeline::new(storage, validator, probe))
}
