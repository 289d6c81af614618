use clap::{Args, Parser, Subcommand};
use rf_core::Config;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ripforge")]
#[command(author, version, about = "Rip DVDs and video files into per-track HandBrake encodes")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rip discs or video files into encoded tracks
    Rip {
        /// Disc device or video file to read (repeatable; defaults to the DVD drive)
        #[arg(short, long = "input")]
        inputs: Vec<PathBuf>,

        /// Title for the input at the same position (repeatable)
        #[arg(short, long = "title")]
        titles: Vec<String>,

        /// Show what would be done without encoding or ejecting
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Inspect a disc and show which tracks would be encoded
    Probe {
        /// Disc device (defaults to the DVD drive)
        device: Option<PathBuf>,

        /// Title override
        #[arg(short, long)]
        title: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Display version information
    Version,
}

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Minimum duration of a track worth encoding (e.g. 10m, 90s)
    #[arg(long = "min", value_parser = parse_min_length)]
    pub min_length: Option<Duration>,

    /// Preset used for whole-file encodes
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Path to the HandBrakeCLI executable
    #[arg(short = 'b', long)]
    pub handbrake: Option<PathBuf>,

    /// HandBrake container format
    #[arg(short = 'x', long)]
    pub format: Option<String>,

    /// HandBrake video encoder
    #[arg(long)]
    pub video: Option<String>,

    /// HandBrake audio encoder
    #[arg(long)]
    pub audio: Option<String>,

    /// Audio language list
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Start encoding at this many seconds
    #[arg(long)]
    pub start: Option<String>,

    /// Stop encoding after this many seconds
    #[arg(long)]
    pub stop: Option<String>,
}

impl ConfigOverrides {
    /// Write every given value into `config`.
    pub fn apply(self, config: &mut Config) {
        if let Some(v) = self.min_length {
            config.min_length = v;
        }
        if let Some(v) = self.preset {
            config.encode.preset = v;
        }
        if let Some(v) = self.handbrake {
            config.tools.handbrake = v;
        }
        if let Some(v) = self.format {
            config.encode.format = v;
        }
        if let Some(v) = self.video {
            config.encode.video_encoder = v;
        }
        if let Some(v) = self.audio {
            config.encode.audio_encoder = v;
        }
        if let Some(v) = self.language {
            config.encode.languages = v;
        }
        if let Some(v) = self.output {
            config.output_dir = v;
        }
        if let Some(v) = self.start.filter(|s| !s.is_empty()) {
            config.encode.start_at = Some(v);
        }
        if let Some(v) = self.stop.filter(|s| !s.is_empty()) {
            config.encode.stop_at = Some(v);
        }
    }
}

fn parse_min_length(s: &str) -> Result<Duration, String> {
    rf_core::config::parse_duration(s).map_err(|e| e.to_string())
}
