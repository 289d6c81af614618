use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rf_core::{Error, ToolsConfig};
use tempfile::TempPath;

use super::{Inspection, Platform, PlatformKind};
use crate::command::ToolCommand;
use crate::inspect::LSDVD_ARGS;

/// Mount point used inside WSL.
const WSL_MOUNT_POINT: &str = "/tmp/ripforge-mnt";

/// Ejects the drive named by the first script argument (e.g. `g:`).
const EJECT_SCRIPT: &str = r#"Set oWMP = CreateObject("WMPlayer.OCX.7")
Set colCDROMs = oWMP.cdromCollection

If colCDROMs.Count >= 1 Then
    For i = 0 To colCDROMs.Count - 1
        If LCase(colCDROMs.Item(i).driveSpecifier) = LCase(WScript.Arguments.Item(0)) Then
            colCDROMs.Item(i).Eject
        End If
    Next
End If
"#;

/// Windows host: lsdvd runs inside WSL against a drvfs mount of the drive,
/// and ejection goes through a VBScript run by the script host.
#[derive(Debug, Clone)]
pub struct WindowsPlatform {
    shell: PathBuf,
    wsl: PathBuf,
    script_host: PathBuf,
    inspect_timeout: Duration,
    script_dir: Option<PathBuf>,
}

impl WindowsPlatform {
    pub fn new(tools: &ToolsConfig, inspect_timeout: Duration) -> Self {
        Self {
            shell: PathBuf::from("cmd.exe"),
            wsl: tools.wsl.clone(),
            script_host: tools.script_host.clone(),
            inspect_timeout,
            script_dir: None,
        }
    }

    /// Write eject scripts into `dir` instead of the system temp directory.
    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = Some(dir.into());
        self
    }

    /// Volume label of the drive, read from `dir` output.
    async fn volume_label(&self, drive: &str) -> rf_core::Result<Option<String>> {
        let mut cmd = ToolCommand::new(self.shell.clone());
        cmd.args(["/c", "dir", drive]);

        tracing::info!("Execute: {cmd}");
        let output = cmd.execute().await?;
        Ok(parse_volume_label(&output.stdout))
    }

    /// Write the eject script to a fresh `.vbs` file.
    ///
    /// The returned path deletes the file when dropped.
    fn write_eject_script(&self) -> rf_core::Result<TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ripforge-eject-").suffix(".vbs");
        let mut file = match &self.script_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(EJECT_SCRIPT.as_bytes())?;
        file.flush()?;
        // Close the handle so the script host can open the file.
        Ok(file.into_temp_path())
    }
}

#[async_trait]
impl Platform for WindowsPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Windows
    }

    fn default_drive(&self) -> Option<PathBuf> {
        None
    }

    async fn inspect_disc(
        &self,
        input: &Path,
        want_fallback_title: bool,
    ) -> rf_core::Result<Inspection> {
        let drive = drive_letter(input)?;

        let fallback_title = if want_fallback_title {
            self.volume_label(&drive).await?
        } else {
            None
        };

        let mut cmd = ToolCommand::new(self.wsl.clone());
        cmd.args(["--", "sh", "-c"]);
        cmd.arg(mount_script(&drive));
        cmd.timeout(self.inspect_timeout);

        tracing::info!("Execute: {cmd}");
        let output = cmd.execute().await?;

        Ok(Inspection {
            fallback_title,
            output: output.stdout,
        })
    }

    async fn eject(&self, input: &Path) -> rf_core::Result<()> {
        let drive = drive_letter(input)?;
        let script = self.write_eject_script()?;

        let mut cmd = ToolCommand::new(self.script_host.clone());
        cmd.arg("//nologo");
        cmd.arg(script.to_string_lossy());
        cmd.arg(drive);

        tracing::info!("Execute: {cmd}");
        let result = cmd.execute().await;

        if let Err(e) = script.close() {
            tracing::debug!("Failed to remove eject script: {e}");
        }

        result.map(|_| ())
    }
}

/// Normalize an input such as `G:` or `g:\` to `g:`.
fn drive_letter(input: &Path) -> rf_core::Result<String> {
    let s = input.to_string_lossy();
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => {
            Ok(format!("{}:", letter.to_ascii_lowercase()))
        }
        _ => Err(Error::config(format!("'{s}' is not a drive letter"))),
    }
}

/// Shell script run inside WSL: mount, inspect, always unmount and clean up,
/// and exit with the status of the inspection.
fn mount_script(drive: &str) -> String {
    let mnt = WSL_MOUNT_POINT;
    format!(
        "mkdir -p {mnt} && sudo mount -t drvfs {drive} {mnt} && lsdvd {args} {mnt}; \
         status=$?; sudo umount {mnt}; rm -rf {mnt}; exit $status",
        args = LSDVD_ARGS.join(" ")
    )
}

/// Last whitespace-delimited field of the first line of `dir` output.
fn parse_volume_label(dir_output: &str) -> Option<String> {
    let first = dir_output.lines().next()?;
    if first.trim_end().ends_with("has no label.") {
        return None;
    }
    first.split_whitespace().last().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_label_from_first_line() {
        let out = " Volume in drive G is KING_OF_QUEENS\r\n Volume Serial Number is 1234-ABCD\r\n";
        assert_eq!(parse_volume_label(out).as_deref(), Some("KING_OF_QUEENS"));
    }

    #[test]
    fn volume_label_absent() {
        assert_eq!(parse_volume_label(""), None);
        assert_eq!(parse_volume_label(" Volume in drive G has no label.\r\n"), None);
    }

    #[test]
    fn drive_letter_normalization() {
        assert_eq!(drive_letter(Path::new("G:")).unwrap(), "g:");
        assert_eq!(drive_letter(Path::new("g:\\")).unwrap(), "g:");
        assert!(matches!(
            drive_letter(Path::new("/dev/sr0")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn mount_script_always_unmounts() {
        let script = mount_script("g:");
        assert!(script.contains("sudo mount -t drvfs g: /tmp/ripforge-mnt"));
        assert!(script.contains("lsdvd -Ox -a -v /tmp/ripforge-mnt"));
        let inspect = script.find("lsdvd").unwrap();
        let umount = script.find("sudo umount").unwrap();
        assert!(umount > inspect);
        assert!(script.ends_with("exit $status"));
    }

    #[test]
    fn eject_script_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let platform = WindowsPlatform::new(&ToolsConfig::default(), Duration::from_secs(3))
            .with_script_dir(dir.path());

        let script = platform.write_eject_script().unwrap();
        let path = script.to_path_buf();
        assert_eq!(path.extension().unwrap(), "vbs");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), EJECT_SCRIPT);

        drop(script);
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn eject_script_is_removed_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tools = ToolsConfig {
            script_host: PathBuf::from("false"),
            ..ToolsConfig::default()
        };
        let platform =
            WindowsPlatform::new(&tools, Duration::from_secs(3)).with_script_dir(dir.path());

        let result = platform.eject(Path::new("G:")).await;
        assert!(matches!(result, Err(Error::Tool { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn eject_script_is_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let tools = ToolsConfig {
            script_host: PathBuf::from("true"),
            ..ToolsConfig::default()
        };
        let platform =
            WindowsPlatform::new(&tools, Duration::from_secs(3)).with_script_dir(dir.path());

        platform.eject(Path::new("G:")).await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stalled_mount_hits_watchdog() {
        // `sleep -- sh -c <script>` is not a valid sleep invocation, so use a
        // wrapper that ignores its arguments and hangs.
        let dir = tempfile::tempdir().unwrap();
        let hang = dir.path().join("hang.sh");
        std::fs::write(&hang, "#!/bin/sh\nsleep 10\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&hang, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let tools = ToolsConfig {
            wsl: hang,
            ..ToolsConfig::default()
        };
        let platform = WindowsPlatform::new(&tools, Duration::from_millis(200));

        let result = platform.inspect_disc(Path::new("G:"), false).await;
        assert!(
            matches!(result, Err(Error::Timeout { .. })),
            "expected timeout, got {result:?}"
        );
    }
}
