//! Per-track decisions: keep or skip, preset, and destination path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rf_core::{Config, DiscDocument, DiscTitle, Track};
use serde::Serialize;

/// Preset for tracks up to [`MAX_720P_WIDTH`] pixels wide.
pub const PRESET_720P: &str = "Fast 720p30";
/// Preset for everything wider.
pub const PRESET_1080P: &str = "Fast 1080p30";
/// Widest track still encoded with the 720p preset.
pub const MAX_720P_WIDTH: u32 = 720;

/// Preset matching the resolution class of `width`.
pub fn preset_for_width(width: u32) -> &'static str {
    if width <= MAX_720P_WIDTH {
        PRESET_720P
    } else {
        PRESET_1080P
    }
}

/// What the policy wants done with one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrackDecision {
    /// Shorter than the configured minimum.
    TooShort,
    /// Candidate for encoding, numbered among the kept tracks.
    Encode {
        sequence: u32,
        destination: PathBuf,
        preset: String,
    },
}

/// A track together with the decision taken for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPlan {
    pub track: Track,
    #[serde(flatten)]
    pub decision: TrackDecision,
}

/// Applies the duration filter, preset selection and output naming.
#[derive(Debug, Clone)]
pub struct TrackPolicy<'a> {
    min_length: Duration,
    output_dir: &'a Path,
    extension: &'a str,
}

impl<'a> TrackPolicy<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            min_length: config.min_length,
            output_dir: &config.output_dir,
            extension: config.encode.extension(),
        }
    }

    /// Decide every track of `document`, in document order.
    ///
    /// Sequence numbers start at 1 and only advance for tracks that pass the
    /// duration filter.
    pub fn plan(&self, title: &DiscTitle, document: &DiscDocument) -> Vec<TrackPlan> {
        let mut sequence = 0;
        document
            .tracks
            .iter()
            .map(|track| {
                let decision = if track.duration() < self.min_length {
                    TrackDecision::TooShort
                } else {
                    sequence += 1;
                    TrackDecision::Encode {
                        sequence,
                        destination: self.destination(title, sequence),
                        preset: preset_for_width(track.width).to_string(),
                    }
                };
                TrackPlan {
                    track: track.clone(),
                    decision,
                }
            })
            .collect()
    }

    /// `<output>/<title>/<title> - NN.<ext>`
    pub fn destination(&self, title: &DiscTitle, sequence: u32) -> PathBuf {
        self.output_dir
            .join(title.as_str())
            .join(format!("{title} - {sequence:02}.{}", self.extension))
    }
}

/// Whether a destination still needs encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationState {
    /// The file is already there; encoding is skipped.
    Exists,
    /// The parent directory is in place and the file is absent.
    Ready,
}

/// Check `destination` and, when `create_dirs` is set, create its parent.
pub fn prepare_destination(
    destination: &Path,
    create_dirs: bool,
) -> rf_core::Result<DestinationState> {
    if destination.exists() {
        return Ok(DestinationState::Exists);
    }

    if create_dirs {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rf_core::Error::config(format!(
                    "cannot create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }

    Ok(DestinationState::Ready)
}
