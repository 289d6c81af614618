//! Platform capabilities: disc inspection, ejection and drive discovery.
//!
//! Everything that differs between a Unix host (direct device access) and a
//! Windows host (lsdvd through WSL, ejection through a script host) lives
//! behind [`Platform`]. The implementation is chosen once by [`detect`].

mod unix;
mod windows;

pub use unix::UnixPlatform;
pub use windows::WindowsPlatform;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rf_core::Config;
use serde::Serialize;

/// Platform family the binary is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlatformKind {
    Unix,
    Windows,
}

impl PlatformKind {
    /// The family of the current host.
    pub fn current() -> Self {
        if cfg!(windows) {
            PlatformKind::Windows
        } else {
            PlatformKind::Unix
        }
    }
}

/// Raw result of running the inspection tool.
#[derive(Debug, Clone, Default)]
pub struct Inspection {
    /// Title recovered from the host (Windows volume label), if requested.
    pub fallback_title: Option<String>,
    /// Unparsed lsdvd output.
    pub output: String,
}

/// Host-specific operations on an optical drive.
#[async_trait]
pub trait Platform: Send + Sync {
    /// The family this implementation serves.
    fn kind(&self) -> PlatformKind;

    /// The drive used when no input is given, if one can be found.
    fn default_drive(&self) -> Option<PathBuf>;

    /// Run the inspection tool against `input`.
    ///
    /// When `want_fallback_title` is set the implementation may also recover
    /// a title from the host itself.
    async fn inspect_disc(
        &self,
        input: &Path,
        want_fallback_title: bool,
    ) -> rf_core::Result<Inspection>;

    /// Eject the disc in `input`.
    async fn eject(&self, input: &Path) -> rf_core::Result<()>;
}

/// Build the platform implementation for the current host.
pub fn detect(config: &Config) -> Arc<dyn Platform> {
    match PlatformKind::current() {
        PlatformKind::Unix => Arc::new(UnixPlatform::new(&config.tools)),
        PlatformKind::Windows => Arc::new(WindowsPlatform::new(
            &config.tools,
            config.inspect_timeout,
        )),
    }
}
