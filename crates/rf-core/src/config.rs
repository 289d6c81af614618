//! Pipeline configuration types.
//!
//! The top-level [`Config`] is built once at startup (file values merged with
//! command-line overrides) and then passed by reference into every stage.
//! Every section defaults sensibly so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default minimum track length: 10 minutes.
const DEFAULT_MIN_LENGTH: Duration = Duration::from_secs(600);

/// Default watchdog budget for the WSL mount indirection.
const DEFAULT_INSPECT_TIMEOUT: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory that receives all encoded files.
    pub output_dir: PathBuf,
    /// Tracks shorter than this are skipped.
    #[serde(with = "duration_str")]
    pub min_length: Duration,
    /// Watchdog budget for the remote-mount inspection path.
    #[serde(with = "duration_str")]
    pub inspect_timeout: Duration,
    pub encode: EncodeConfig,
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            min_length: DEFAULT_MIN_LENGTH,
            inspect_timeout: DEFAULT_INSPECT_TIMEOUT,
            encode: EncodeConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.min_length.is_zero() {
            warnings.push("min_length is 0; every track will be encoded".into());
        }

        if !self.encode.format.contains('_') {
            warnings.push(format!(
                "encode.format '{}' has no '_'; the whole value is used as file extension",
                self.encode.format
            ));
        }

        if self.encode.languages.trim().is_empty() {
            warnings.push("encode.languages is empty".into());
        }

        for (name, value) in [
            ("encode.start_at", &self.encode.start_at),
            ("encode.stop_at", &self.encode.stop_at),
        ] {
            if let Some(v) = value {
                if v.parse::<f64>().is_err() {
                    warnings.push(format!("{name} '{v}' is not a number of seconds"));
                }
            }
        }

        warnings
    }
}

/// `~/Videos` when it exists on non-Windows hosts, the working directory otherwise.
fn default_output_dir() -> PathBuf {
    if !cfg!(windows) {
        if let Some(home) = std::env::var_os("HOME") {
            let videos = PathBuf::from(home).join("Videos");
            if videos.is_dir() {
                return videos;
            }
        }
    }
    PathBuf::from(".")
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Options handed to the transcoder for every job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Preset used when no track width is known (whole-file mode).
    pub preset: String,
    /// HandBrake container format, e.g. `av_mp4`.
    pub format: String,
    pub video_encoder: String,
    pub audio_encoder: String,
    /// Comma separated audio language list, also used as native language.
    pub languages: String,
    /// Seconds to skip at the start of every track.
    pub start_at: Option<String>,
    /// Seconds after which encoding stops.
    pub stop_at: Option<String>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            preset: "Fast 1080p30".into(),
            format: "av_mp4".into(),
            video_encoder: "nvenc_h264".into(),
            audio_encoder: "copy".into(),
            languages: "ger,eng".into(),
            start_at: None,
            stop_at: None,
        }
    }
}

impl EncodeConfig {
    /// File extension derived from the format: the part after the last `_`.
    pub fn extension(&self) -> &str {
        match self.format.rfind('_') {
            Some(p) => &self.format[p + 1..],
            None => &self.format,
        }
    }
}

/// Paths to the external programs.
///
/// Bare names are resolved through `PATH` when the tool is spawned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub handbrake: PathBuf,
    pub lsdvd: PathBuf,
    pub eject: PathBuf,
    /// Windows script host used to run the eject script.
    pub script_host: PathBuf,
    /// Windows entry point into the Linux subsystem.
    pub wsl: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            handbrake: PathBuf::from("HandBrakeCLI"),
            lsdvd: PathBuf::from("lsdvd"),
            eject: PathBuf::from("eject"),
            script_host: PathBuf::from("cscript"),
            wsl: PathBuf::from("wsl"),
        }
    }
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// Parse a duration literal such as `10m`, `1h30m`, `90s`, `1.5h` or `600`.
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::config("empty duration"));
    }

    if let Ok(secs) = s.parse::<f64>() {
        return to_duration(s, secs);
    }

    let mut total = 0.0_f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| Error::config(format!("duration '{s}' is missing a unit")))?;
        if num_end == 0 {
            return Err(Error::config(format!("invalid duration '{s}'")));
        }
        let value: f64 = rest[..num_end]
            .parse()
            .map_err(|_| Error::config(format!("invalid duration '{s}'")))?;
        rest = &rest[num_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let factor = match &rest[..unit_end] {
            "h" => 3600.0,
            "m" => 60.0,
            "s" => 1.0,
            "ms" => 0.001,
            unit => {
                return Err(Error::config(format!(
                    "unknown unit '{unit}' in duration '{s}'"
                )))
            }
        };
        total += value * factor;
        rest = &rest[unit_end..];
    }

    to_duration(s, total)
}

fn to_duration(s: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| Error::config(format!("duration '{s}' is out of range")))
}

/// Serde helpers to (de)serialize `Duration` as a duration literal.
mod duration_str {
    use serde::{self, de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs_f64()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_duration(&s).map_err(de::Error::custom)
    }
}
