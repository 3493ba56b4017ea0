use serde::Serialize;
use crate::services::cleanup::ProjectInfo;
use crate::services::ingest::IngestReport;
use crate::Result;

/// Renders pipeline and retention results for the terminal.
pub struct Reporter;

#[derive(Serialize)]
struct IngestSummary<'a> {
    original_name: &'a str,
    extension: Option<&'a str>,
    stored_path: String,
    size_mb: f64,
    duration_seconds: f64,
    duration_hms: String,
    codec_name: Option<&'a str>,
    bitrate_bps: Option<u64>,
    sample_rate_hz: Option<u64>,
    channels: Option<u64>,
}

impl<'a> IngestSummary<'a> {
    fn from_report(report: &'a IngestReport) -> Self {
        let metadata = &report.metadata;
        Self {
            original_name: &report.original_name,
            extension: report.extension.as_deref(),
            stored_path: report.stored_path.display().to_string(),
            size_mb: round_to(report.size_bytes as f64 / 1024.0 / 1024.0, 2),
            duration_seconds: round_to(metadata.duration_seconds, 3),
            duration_hms: metadata.duration_hms(),
            codec_name: metadata.codec_name.as_deref(),
            bitrate_bps: metadata.bitrate_bps,
            sample_rate_hz: metadata.sample_rate_hz,
            channels: metadata.channels,
        }
    }
}

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    pub fn ingest_summary(&self, report: &IngestReport) -> String {
        let summary = IngestSummary::from_report(report);
        let lines = [
            "File uploaded, validated, and inspected successfully".to_string(),
            format!("  Original name: {}", summary.original_name),
            format!("  Extension:     {}", summary.extension.unwrap_or("-")),
            format!("  Stored path:   {}", summary.stored_path),
            format!("  Size:          {:.2} MB", summary.size_mb),
            String::new(),
            "Audio metadata".to_string(),
            format!("  Duration:      {} ({:.3}s)", summary.duration_hms, summary.duration_seconds),
            format!("  Codec:         {}", summary.codec_name.unwrap_or("unknown")),
            format!("  Bitrate:       {}", optional(summary.bitrate_bps, "bps")),
            format!("  Sample rate:   {}", optional(summary.sample_rate_hz, "Hz")),
            format!("  Channels:      {}", optional(summary.channels, "")),
        ];
        lines.join("\n")
    }

    pub fn ingest_json(&self, report: &IngestReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(&IngestSummary::from_report(report))?)
    }

    pub fn projects_table(&self, projects: &[ProjectInfo]) -> String {
        if projects.is_empty() {
            return "No projects found.".to_string();
        }

        let width = projects.iter().map(|p| p.id.len()).max().unwrap_or(0).max("Project".len());
        let mut lines = vec![format!("{:<width$}  {:>10}  {:>12}", "Project", "Age (h)", "Size (bytes)")];
        lines.extend(projects.iter().map(|project| {
            format!(
                "{:<width$}  {:>10.1}  {:>12}",
                project.id,
                project.age_secs as f64 / 3600.0,
                project.size_bytes
            )
        }));
        lines.push(format!("{} projects", projects.len()));
        lines.join("\n")
    }

    pub fn projects_json(&self, projects: &[ProjectInfo]) -> Result<String> {
        Ok(serde_json::to_string_pretty(projects)?)
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn optional(value: Option<u64>, unit: &str) -> String {
    match (value, unit) {
        (Some(v), "") => v.to_string(),
        (Some(v), unit) => format!("{} {}", v, unit),
        (None, _) => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AudioMetadata;
    use std::path::PathBuf;

    fn report() -> IngestReport {
        IngestReport {
            original_name: "track.mp3".to_string(),
            stored_path: PathBuf::from("/data/tmp/abc_track.mp3"),
            extension: Some("mp3".to_string()),
            size_bytes: 4 * 1024 * 1024,
            metadata: AudioMetadata {
                duration_seconds: 185.4249,
                codec_name: Some("mp3".to_string()),
                bitrate_bps: Some(128000),
                sample_rate_hz: Some(44100),
                channels: None,
            },
        }
    }

    #[test]
    fn summary_lists_metadata() {
        let text = Reporter::new().ingest_summary(&report());
        assert!(text.contains("Original name: track.mp3"));
        assert!(text.contains("Size:          4.00 MB"));
        assert!(text.contains("Duration:      00:03:05 (185.425s)"));
        assert!(text.contains("Bitrate:       128000 bps"));
        assert!(text.contains("Channels:      unknown"));
        assert!(text.contains("MB\n\nAudio metadata"));
        assert_eq!(text.lines().count(), 12);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn json_summary_rounds_like_the_ui() {
        let json = Reporter::new().ingest_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["size_mb"], 4.0);
        assert_eq!(value["duration_seconds"], 185.425);
        assert_eq!(value["duration_hms"], "00:03:05");
        assert_eq!(value["channels"], serde_json::Value::Null);
    }

    #[test]
    fn project_table() {
        let reporter = Reporter::new();
        assert_eq!(reporter.projects_table(&[]), "No projects found.");

        let table = reporter.projects_table(&[ProjectInfo {
            id: "p1".to_string(),
            age_secs: 7200,
            size_bytes: 42,
        }]);
        assert!(table.contains("p1"));
        assert!(table.contains("2.0"));
        assert!(table.ends_with("1 projects"));
        assert_eq!(table.lines().count(), 3);
    }
}
