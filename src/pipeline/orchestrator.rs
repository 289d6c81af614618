//! The ripping run: walks the inputs and drives extraction, policy,
//! transcoding and ejection for each of them in turn.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rf_av::{format_elapsed, EncodeJob, MetadataExtractor, Platform, Transcoder};
use rf_core::{capitalize, Config, Error, Track};
use serde::Serialize;

use super::policy::{prepare_destination, DestinationState, TrackDecision, TrackPolicy};

/// What happened to a single track or file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackOutcome {
    /// Shorter than the minimum length.
    TooShort,
    /// The destination was already present.
    AlreadyExists,
    /// Would have been encoded (dry run).
    Planned,
    /// The transcoder produced the destination.
    Encoded,
}

/// Per-track entry of an [`InputReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackReport {
    /// Track index; `None` for a whole-file input.
    pub index: Option<u32>,
    pub destination: Option<PathBuf>,
    pub outcome: TrackOutcome,
}

/// Result of processing one input.
#[derive(Debug, Clone, Serialize)]
pub struct InputReport {
    pub input: PathBuf,
    pub title: String,
    pub tracks: Vec<TrackReport>,
    pub ejected: bool,
    pub elapsed: Duration,
}

impl InputReport {
    /// Number of tracks with the given outcome.
    pub fn count(&self, outcome: TrackOutcome) -> usize {
        self.tracks.iter().filter(|t| t.outcome == outcome).count()
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub inputs: Vec<InputReport>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Number of tracks with the given outcome across all inputs.
    pub fn count(&self, outcome: TrackOutcome) -> usize {
        self.inputs.iter().map(|i| i.count(outcome)).sum()
    }
}

/// Drives the pipeline over a list of inputs.
pub struct Ripper {
    config: Config,
    platform: Arc<dyn Platform>,
    extractor: MetadataExtractor,
    transcoder: Arc<dyn Transcoder>,
    dry_run: bool,
}

impl Ripper {
    pub fn new(
        config: Config,
        platform: Arc<dyn Platform>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            config,
            extractor: MetadataExtractor::new(platform.clone()),
            platform,
            transcoder,
            dry_run: false,
        }
    }

    /// Plan only: no directories, no transcoding, no ejection.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The inputs to process: the given ones, or the default drive.
    pub fn resolve_inputs(&self, inputs: Vec<PathBuf>) -> rf_core::Result<Vec<PathBuf>> {
        if !inputs.is_empty() {
            return Ok(inputs);
        }
        self.platform
            .default_drive()
            .map(|drive| vec![drive])
            .ok_or_else(|| Error::config("no input given and no default drive found"))
    }

    /// Process `inputs` in order; `titles[i]` overrides the title of `inputs[i]`.
    ///
    /// The first error aborts the run. Work finished before it stays on disk.
    pub async fn run(
        &self,
        inputs: &[PathBuf],
        titles: &[String],
    ) -> rf_core::Result<RunReport> {
        let start = Instant::now();
        let mut reports = Vec::with_capacity(inputs.len());

        let default_drive = self.platform.default_drive();
        if inputs.len() == 1 && default_drive.as_deref() == Some(inputs[0].as_path()) {
            if !titles.is_empty() {
                tracing::warn!(
                    "Ignoring title override for default drive {}",
                    inputs[0].display()
                );
            }
            reports.push(self.process(&inputs[0], None).await?);
        } else {
            for (i, input) in inputs.iter().enumerate() {
                let title = titles.get(i).map(String::as_str).filter(|t| !t.is_empty());
                reports.push(self.process(input, title).await?);
            }
        }

        Ok(RunReport {
            inputs: reports,
            elapsed: start.elapsed(),
        })
    }

    async fn process(
        &self,
        source: &Path,
        title: Option<&str>,
    ) -> rf_core::Result<InputReport> {
        self.check_output_dir()?;

        let metadata = tokio::fs::metadata(source).await.map_err(|e| {
            Error::config(format!("cannot access input {}: {e}", source.display()))
        })?;

        if metadata.is_file() {
            self.process_file(source, title).await
        } else {
            self.process_disc(source, title).await
        }
    }

    fn check_output_dir(&self) -> rf_core::Result<()> {
        let dir = &self.config.output_dir;
        if !dir.exists() {
            return Err(Error::config(format!(
                "output directory {} does not exist",
                dir.display()
            )));
        }
        if !dir.is_dir() {
            return Err(Error::config(format!("{} is not a directory", dir.display())));
        }
        Ok(())
    }

    /// Whole-file shortcut: one job, no track selector, no eject.
    async fn process_file(
        &self,
        source: &Path,
        title: Option<&str>,
    ) -> rf_core::Result<InputReport> {
        let start = Instant::now();

        let title = title.ok_or_else(|| {
            Error::config(format!(
                "a title is required for file input {}",
                source.display()
            ))
        })?;
        tracing::info!("Used Title: {title}");

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| Error::config(format!("{} has no file name", source.display())))?;
        let destination = self.config.output_dir.join(format!(
            "{}.{}",
            capitalize(&stem),
            self.config.encode.extension()
        ));

        if same_file(source, &destination) {
            return Err(Error::config(format!(
                "{} would overwrite its own source",
                destination.display()
            )));
        }

        let outcome = if self.dry_run {
            TrackOutcome::Planned
        } else {
            if destination.exists() {
                backup(&destination)?;
            }
            let job = EncodeJob {
                source: source.to_path_buf(),
                selector: None,
                destination: destination.clone(),
                preset: self.config.encode.preset.clone(),
                options: self.config.encode.clone(),
            };
            self.transcoder.encode(&job).await?;
            TrackOutcome::Encoded
        };

        Ok(InputReport {
            input: source.to_path_buf(),
            title: title.to_string(),
            tracks: vec![TrackReport {
                index: None,
                destination: Some(destination),
                outcome,
            }],
            ejected: false,
            elapsed: start.elapsed(),
        })
    }

    /// Full disc flow: extract, decide per track, encode, eject.
    async fn process_disc(
        &self,
        source: &Path,
        title: Option<&str>,
    ) -> rf_core::Result<InputReport> {
        let (title, document) = self.extractor.extract(source, title).await?;
        tracing::info!("Used Title: {title}");

        let start = Instant::now();
        let policy = TrackPolicy::new(&self.config);
        let mut tracks = Vec::with_capacity(document.tracks.len());

        for plan in policy.plan(&title, &document) {
            tracing::info!(
                "Track {}: {}",
                plan.track.index,
                format_elapsed(plan.track.duration())
            );

            let report = match plan.decision {
                TrackDecision::TooShort => {
                    tracing::info!("Track too short -> skip!");
                    TrackReport {
                        index: Some(plan.track.index),
                        destination: None,
                        outcome: TrackOutcome::TooShort,
                    }
                }
                TrackDecision::Encode {
                    destination,
                    preset,
                    ..
                } => {
                    let outcome = self
                        .encode_track(source, &plan.track, &destination, preset)
                        .await?;
                    TrackReport {
                        index: Some(plan.track.index),
                        destination: Some(destination),
                        outcome,
                    }
                }
            };
            tracks.push(report);
        }

        tracing::info!("Total time needed: {}", format_elapsed(start.elapsed()));

        let ejected = if self.dry_run {
            false
        } else {
            self.platform.eject(source).await?;
            true
        };

        Ok(InputReport {
            input: source.to_path_buf(),
            title: title.to_string(),
            tracks,
            ejected,
            elapsed: start.elapsed(),
        })
    }

    async fn encode_track(
        &self,
        source: &Path,
        track: &Track,
        destination: &Path,
        preset: String,
    ) -> rf_core::Result<TrackOutcome> {
        if prepare_destination(destination, !self.dry_run)? == DestinationState::Exists {
            tracing::info!(
                "Target file {} already exists -> skip!",
                destination.display()
            );
            return Ok(TrackOutcome::AlreadyExists);
        }

        if self.dry_run {
            tracing::info!("Dry run: would encode {}", destination.display());
            return Ok(TrackOutcome::Planned);
        }

        let job = EncodeJob {
            source: source.to_path_buf(),
            selector: Some(track.selector()),
            destination: destination.to_path_buf(),
            preset,
            options: self.config.encode.clone(),
        };
        self.transcoder.encode(&job).await?;
        Ok(TrackOutcome::Encoded)
    }
}

/// Both paths exist and resolve to the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Move an existing file to `<name>.bak`, replacing an older backup.
fn backup(path: &Path) -> rf_core::Result<()> {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    let backup = PathBuf::from(name);

    if backup.exists() {
        std::fs::remove_file(&backup)?;
    }
    std::fs::rename(path, &backup)?;
    tracing::info!("Backed up {} to {}", path.display(), backup.display());
    Ok(())
}
