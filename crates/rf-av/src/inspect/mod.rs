//! Disc metadata extraction.
//!
//! [`MetadataExtractor`] asks the [`Platform`] to run lsdvd, parses the result
//! and resolves the disc title.

mod lsdvd;

pub use lsdvd::{parse_lsdvd, strip_malformed_lines, LSDVD_ARGS};

use std::path::Path;
use std::sync::Arc;

use rf_core::{DiscDocument, DiscTitle, Error};

use crate::platform::Platform;

/// Title lsdvd reports for discs without a usable name.
const UNKNOWN_TITLE: &str = "unknown";

/// Runs the inspection tool and turns its output into a titled document.
#[derive(Clone)]
pub struct MetadataExtractor {
    platform: Arc<dyn Platform>,
}

impl MetadataExtractor {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Inspect `input` and resolve its title.
    ///
    /// The override wins when given. Otherwise the host fallback title is
    /// used, then the disc's own title. The chosen value is always
    /// normalized.
    ///
    /// # Errors
    ///
    /// - [`Error::Parse`] when the output has no `lsdvd` root or no title.
    /// - [`Error::UnknownTitle`] when the disc calls itself `unknown` and no
    ///   override was given.
    /// - Any tool or timeout error raised by the platform.
    pub async fn extract(
        &self,
        input: &Path,
        title_override: Option<&str>,
    ) -> rf_core::Result<(DiscTitle, DiscDocument)> {
        let inspection = self
            .platform
            .inspect_disc(input, title_override.is_none())
            .await?;

        let document = parse_lsdvd(&inspection.output)?;
        tracing::debug!(
            "lsdvd reported {} track(s) for {}",
            document.tracks.len(),
            input.display()
        );

        let raw_title = match (title_override, inspection.fallback_title) {
            (Some(t), _) => t.to_string(),
            (None, Some(t)) => t,
            (None, None) => {
                let t = document
                    .title
                    .clone()
                    .ok_or_else(|| Error::parse("lsdvd", "cannot find title element"))?;
                if t == UNKNOWN_TITLE {
                    return Err(Error::UnknownTitle {
                        input: input.display().to_string(),
                    });
                }
                t
            }
        };

        let title = DiscTitle::normalize(&raw_title);
        if title.is_empty() {
            return Err(Error::config(format!(
                "title '{raw_title}' is empty after normalization"
            )));
        }

        tracing::info!("Metadata title: {title}");
        Ok((title, document))
    }
}
