use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rf_core::ToolsConfig;

use super::{Inspection, Platform, PlatformKind};
use crate::command::ToolCommand;
use crate::inspect::LSDVD_ARGS;

/// Device nodes probed, in order, for the default drive.
const DRIVE_CANDIDATES: &[&str] = &["/dev/dvd", "/dev/sr0", "/dev/cdrom"];

/// Direct device access: lsdvd and eject run against the device node.
#[derive(Debug, Clone)]
pub struct UnixPlatform {
    lsdvd: PathBuf,
    eject: PathBuf,
}

impl UnixPlatform {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            lsdvd: tools.lsdvd.clone(),
            eject: tools.eject.clone(),
        }
    }
}

#[async_trait]
impl Platform for UnixPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Unix
    }

    fn default_drive(&self) -> Option<PathBuf> {
        DRIVE_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    async fn inspect_disc(
        &self,
        input: &Path,
        _want_fallback_title: bool,
    ) -> rf_core::Result<Inspection> {
        let mut cmd = ToolCommand::new(self.lsdvd.clone());
        cmd.args(LSDVD_ARGS);
        cmd.arg(input.to_string_lossy());

        tracing::info!("Execute: {cmd}");
        let output = cmd.execute().await?;

        Ok(Inspection {
            fallback_title: None,
            output: output.stdout,
        })
    }

    async fn eject(&self, input: &Path) -> rf_core::Result<()> {
        let mut cmd = ToolCommand::new(self.eject.clone());
        cmd.arg(input.to_string_lossy());

        tracing::info!("Execute: {cmd}");
        cmd.execute().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(lsdvd: &str, eject: &str) -> UnixPlatform {
        UnixPlatform::new(&ToolsConfig {
            lsdvd: PathBuf::from(lsdvd),
            eject: PathBuf::from(eject),
            ..ToolsConfig::default()
        })
    }

    #[tokio::test]
    async fn missing_lsdvd_is_tool_error() {
        let p = platform("nonexistent_tool_xyz_12345", "eject");
        let result = p.inspect_disc(Path::new("/dev/sr0"), true).await;
        assert!(matches!(result, Err(rf_core::Error::Tool { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn inspect_captures_stdout() {
        // `echo` stands in for lsdvd and prints its arguments back.
        let p = platform("echo", "eject");
        let inspection = p.inspect_disc(Path::new("/dev/sr0"), true).await.unwrap();
        assert!(inspection.output.contains("/dev/sr0"));
        assert!(inspection.fallback_title.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn eject_reports_failure() {
        let p = platform("lsdvd", "false");
        let result = p.eject(Path::new("/dev/sr0")).await;
        assert!(matches!(result, Err(rf_core::Error::Tool { .. })));

        let p = platform("lsdvd", "true");
        assert!(p.eject(Path::new("/dev/sr0")).await.is_ok());
    }
}
