use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};
use log::{debug, warn};
use serde_json::Value;
use crate::AudioMetadata;

const DEFAULT_EXECUTABLE: &str = "ffprobe";

/// Any failure to obtain metadata from the probe, reduced to a readable cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProbeError {
    message: String,
}

impl ProbeError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Out-of-process metadata extraction.
pub trait MetadataProbe {
    /// Whether the probe can be invoked at all. Never fails.
    fn is_available(&self) -> bool;

    fn read_metadata(&self, path: &Path) -> Result<AudioMetadata, ProbeError>;
}

/// Shells out to `ffprobe` and reads its JSON report.
#[derive(Debug, Clone)]
pub struct FfprobeClient {
    executable: OsString,
}

impl Default for FfprobeClient {
    fn default() -> Self {
        Self::with_executable(DEFAULT_EXECUTABLE)
    }
}

impl FfprobeClient {
    /// Use a specific executable name or path instead of `ffprobe` from `PATH`.
    pub fn with_executable(executable: impl Into<OsString>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &OsStr {
        &self.executable
    }

    fn run<I, S>(&self, args: I) -> Result<String, ProbeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ProbeError::new("ffprobe not found in PATH"),
                _ => ProbeError::new(format!("failed to run ffprobe: {}", e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::new(format!("ffprobe failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl MetadataProbe for FfprobeClient {
    fn is_available(&self) -> bool {
        match self.run(["-version"]) {
            Ok(_) => true,
            Err(e) => {
                debug!("{:?} is not usable: {}", self.executable, e);
                false
            }
        }
    }

    fn read_metadata(&self, path: &Path) -> Result<AudioMetadata, ProbeError> {
        debug!("Probing {}", path.display());
        let mut args: Vec<&OsStr> = ["-v", "error", "-print_format", "json", "-show_format", "-show_streams"]
            .into_iter()
            .map(OsStr::new)
            .collect();
        args.push(path.as_os_str());

        let result = self.run(args).and_then(|stdout| parse_probe_output(&stdout));
        if let Err(ref e) = result {
            warn!("Probe of {} failed: {}", path.display(), e);
        }
        result
    }
}

/// Turn an ffprobe JSON report into [`AudioMetadata`].
///
/// Only `format.duration` is mandatory. Every other field degrades to `None`
/// when it is missing or does not have the expected shape. Stream fields come
/// from the first stream whose `codec_type` is `"audio"`.
pub fn parse_probe_output(stdout: &str) -> Result<AudioMetadata, ProbeError> {
    let payload: Value = serde_json::from_str(stdout.trim())
        .map_err(|_| ProbeError::new("ffprobe returned invalid JSON"))?;

    let format = payload.get("format");
    let duration_seconds = format
        .and_then(|f| f.get("duration"))
        .and_then(to_float)
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| ProbeError::new("Missing or invalid duration from ffprobe"))?;
    let bitrate_bps = format.and_then(|f| f.get("bit_rate")).and_then(to_uint);

    let audio_stream = first_audio_stream(&payload);

    Ok(AudioMetadata {
        duration_seconds,
        codec_name: stream_field(audio_stream, "codec_name")
            .and_then(Value::as_str)
            .map(str::to_string),
        bitrate_bps,
        sample_rate_hz: stream_field(audio_stream, "sample_rate").and_then(to_uint),
        channels: stream_field(audio_stream, "channels").and_then(to_uint),
    })
}

fn first_audio_stream(payload: &Value) -> Option<&Value> {
    payload
        .get("streams")
        .and_then(Value::as_array)?
        .iter()
        .find(|stream| stream.get("codec_type").and_then(Value::as_str) == Some("audio"))
}

fn stream_field<'a>(stream: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    stream.and_then(|s| s.get(key))
}

// ffprobe reports numbers as strings; accept real JSON numbers too.
fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_uint(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
