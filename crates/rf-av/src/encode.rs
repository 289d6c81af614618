//! Transcoding through HandBrakeCLI.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rf_core::EncodeConfig;
use serde::Serialize;

use crate::command::ToolCommand;

/// Timestamp format for the start/end log lines.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One transcoder invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodeJob {
    /// Disc device or input file.
    pub source: PathBuf,
    /// Track selector; `None` encodes the whole source.
    pub selector: Option<String>,
    pub destination: PathBuf,
    pub preset: String,
    pub options: EncodeConfig,
}

impl EncodeJob {
    /// Full HandBrakeCLI argument list for this job.
    pub fn handbrake_args(&self) -> Vec<String> {
        let o = &self.options;
        let mut args: Vec<String> = vec![
            "--preset".into(),
            self.preset.clone(),
            "--input".into(),
            self.source.to_string_lossy().into(),
            "--output".into(),
            self.destination.to_string_lossy().into(),
            "--format".into(),
            o.format.clone(),
            "--optimize".into(),
            "--keep-display-aspect".into(),
            "--comb-detect".into(),
            "--decomb".into(),
            format!("--encoder={}", o.video_encoder),
            format!("--audio-lang-list={}", o.languages),
            format!("--aencoder={}", o.audio_encoder),
            "--loose-crop".into(),
            "--subtitle".into(),
            "scan".into(),
            "--subtitle-forced".into(),
            "--subtitle-burned".into(),
            format!("--native-language={}", o.languages),
        ];

        if let Some(selector) = self.selector.as_deref().filter(|s| !s.is_empty()) {
            args.extend(["--title".into(), selector.to_string()]);
        }

        if let Some(start) = o.start_at.as_deref().filter(|s| !s.is_empty()) {
            args.extend(["--start-at".into(), format!("duration:{start}")]);
        }

        if let Some(stop) = o.stop_at.as_deref().filter(|s| !s.is_empty()) {
            args.extend(["--stop-at".into(), format!("duration:{stop}")]);
        }

        args
    }
}

/// Something that turns an [`EncodeJob`] into an output file.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Run the job to completion.
    async fn encode(&self, job: &EncodeJob) -> rf_core::Result<()>;
}

/// [`Transcoder`] backed by the HandBrakeCLI executable.
#[derive(Debug, Clone)]
pub struct HandBrake {
    program: PathBuf,
}

impl HandBrake {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// The command that would run `job`.
    pub fn command(&self, job: &EncodeJob) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.program.clone());
        cmd.args(job.handbrake_args());
        cmd.inherit_output();
        cmd
    }
}

#[async_trait]
impl Transcoder for HandBrake {
    async fn encode(&self, job: &EncodeJob) -> rf_core::Result<()> {
        tracing::info!(
            "Encode: {} -> {}",
            job.source.display(),
            job.destination.display()
        );
        tracing::info!("Start: {}", chrono::Local::now().format(TIMESTAMP_FORMAT));

        let cmd = self.command(job);
        tracing::info!("Execute: {cmd}");

        let start = Instant::now();
        let result = cmd.execute().await;

        tracing::info!("End: {}", chrono::Local::now().format(TIMESTAMP_FORMAT));
        tracing::info!("Time needed: {}", format_elapsed(start.elapsed()));

        if let Err(ref e) = result {
            tracing::error!("Encoding {} failed: {e}", job.destination.display());
        }
        result.map(|_| ())
    }
}

/// Render a duration as `H:MM:SS`.
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> EncodeJob {
        EncodeJob {
            source: PathBuf::from("/dev/sr0"),
            selector: Some("3".into()),
            destination: PathBuf::from("/videos/Star Trek/Star Trek - 01.mp4"),
            preset: "Fast 720p30".into(),
            options: EncodeConfig::default(),
        }
    }

    #[test]
    fn fixed_arguments_in_order() {
        let args = job().handbrake_args();
        assert_eq!(
            &args[..21],
            &[
                "--preset",
                "Fast 720p30",
                "--input",
                "/dev/sr0",
                "--output",
                "/videos/Star Trek/Star Trek - 01.mp4",
                "--format",
                "av_mp4",
                "--optimize",
                "--keep-display-aspect",
                "--comb-detect",
                "--decomb",
                "--encoder=nvenc_h264",
                "--audio-lang-list=ger,eng",
                "--aencoder=copy",
                "--loose-crop",
                "--subtitle",
                "scan",
                "--subtitle-forced",
                "--subtitle-burned",
                "--native-language=ger,eng",
            ]
        );
        assert_eq!(&args[21..], &["--title", "3"]);
    }

    #[test]
    fn whole_file_has_no_title_selector() {
        let mut j = job();
        j.selector = None;
        assert!(!j.handbrake_args().contains(&"--title".to_string()));

        j.selector = Some(String::new());
        assert!(!j.handbrake_args().contains(&"--title".to_string()));
    }

    #[test]
    fn trim_points_are_appended() {
        let mut j = job();
        j.options.start_at = Some("30".into());
        j.options.stop_at = Some("1200".into());
        let args = j.handbrake_args();
        let tail: Vec<&str> = args[args.len() - 4..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec!["--start-at", "duration:30", "--stop-at", "duration:1200"]
        );

        j.options.start_at = Some(String::new());
        j.options.stop_at = None;
        let args = j.handbrake_args();
        assert!(!args.iter().any(|a| a.starts_with("--start-at") || a.starts_with("--stop-at")));
    }

    #[test]
    fn command_renders_program_and_args() {
        let hb = HandBrake::new(PathBuf::from("HandBrakeCLI"));
        let rendered = hb.command(&job()).to_string();
        assert!(rendered.starts_with("HandBrakeCLI --preset \"Fast 720p30\" --input /dev/sr0"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_transcoder_is_tool_error() {
        let hb = HandBrake::new(PathBuf::from("false"));
        let result = hb.encode(&job()).await;
        assert!(matches!(result, Err(rf_core::Error::Tool { .. })));
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(1334)), "0:22:14");
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "1:02:05");
    }
}
