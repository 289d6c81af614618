//! Disc domain types: the parsed inspection document, its tracks, and the
//! normalized disc title.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Structured form of the disc-inspection output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscDocument {
    /// Disc-level title as reported by the tool, if present.
    pub title: Option<String>,
    /// Tracks in the order the tool reported them.
    pub tracks: Vec<Track>,
}

/// A single title/track on the disc.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// 1-based index assigned by the inspection tool.
    pub index: u32,
    /// Playback length in seconds.
    pub length: f64,
    /// Video width in pixels.
    pub width: u32,
}

impl Track {
    /// Length rounded down to whole seconds.
    pub fn duration(&self) -> Duration {
        if self.length.is_finite() && self.length > 0.0 {
            Duration::from_secs(self.length.floor() as u64)
        } else {
            Duration::ZERO
        }
    }

    /// Track selector handed to the transcoder.
    pub fn selector(&self) -> String {
        self.index.to_string()
    }
}

/// A disc title normalized for display and for use as a path segment.
///
/// Words are separated by `_`, whitespace or path separators; each word is
/// lower-cased and then capitalized, and the words are joined with single
/// spaces. Words made only of dots are dropped, so the result never names a
/// parent or current directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DiscTitle(String);

impl DiscTitle {
    pub fn normalize(raw: &str) -> Self {
        let words: Vec<String> = raw
            .split(|c: char| matches!(c, '_' | '/' | '\\') || c.is_whitespace())
            .filter(|w| !w.is_empty() && !w.chars().all(|c| c == '.'))
            .map(|w| capitalize(&w.to_lowercase()))
            .collect();
        Self(words.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DiscTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DiscTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_underscored_titles() {
        assert_eq!(DiscTitle::normalize("star_trek").as_str(), "Star Trek");
        assert_eq!(DiscTitle::normalize("STAR_TREK").as_str(), "Star Trek");
        assert_eq!(
            DiscTitle::normalize("KING_OF_QUEENS_S1_D2").as_str(),
            "King Of Queens S1 D2"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["star_trek", "STAR_TREK", "king of queens", "A__b", "x"] {
            let once = DiscTitle::normalize(raw);
            let twice = DiscTitle::normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(DiscTitle::normalize("__a__b__").as_str(), "A B");
        assert_eq!(DiscTitle::normalize("  mixed_ case ").as_str(), "Mixed Case");
        assert!(DiscTitle::normalize("___").is_empty());
    }

    #[test]
    fn normalize_strips_path_components() {
        assert_eq!(DiscTitle::normalize("../escaped").as_str(), "Escaped");
        assert_eq!(DiscTitle::normalize("a/b\\c").as_str(), "A B C");
        assert_eq!(DiscTitle::normalize("/etc/passwd").as_str(), "Etc Passwd");
        assert_eq!(DiscTitle::normalize("dr. who").as_str(), "Dr. Who");
        assert!(DiscTitle::normalize("../..").is_empty());
        for raw in ["../escaped", "a/b\\c", ". .. ..."] {
            let once = DiscTitle::normalize(raw);
            assert_eq!(once, DiscTitle::normalize(once.as_str()));
        }
    }

    #[test]
    fn capitalize_keeps_tail() {
        assert_eq!(capitalize("episode01"), "Episode01");
        assert_eq!(capitalize("mYfile"), "MYfile");
        assert_eq!(capitalize("über"), "Über");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn track_duration_rounds_down() {
        let track = Track {
            index: 1,
            length: 599.999,
            width: 720,
        };
        assert_eq!(track.duration(), Duration::from_secs(599));
        assert_eq!(track.selector(), "1");

        let broken = Track {
            index: 2,
            length: f64::NAN,
            width: 720,
        };
        assert_eq!(broken.duration(), Duration::ZERO);
    }
}
