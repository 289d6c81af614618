//! External tool detection.
//!
//! The [`ToolRegistry`] resolves the programs a platform needs (lsdvd,
//! HandBrakeCLI, eject, or the Windows script host and WSL launcher) from the
//! configured paths, falling back to a `PATH` lookup.

use std::path::{Path, PathBuf};

use rf_core::ToolsConfig;
use serde::Serialize;

use crate::platform::PlatformKind;

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Configured path or program name.
    pub configured: PathBuf,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry of the tools one platform family depends on.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<(&'static str, PathBuf)>,
}

impl ToolRegistry {
    /// Collect the tools `kind` needs from the configuration.
    pub fn for_platform(kind: PlatformKind, config: &ToolsConfig) -> Self {
        let tools = match kind {
            PlatformKind::Unix => vec![
                ("lsdvd", config.lsdvd.clone()),
                ("HandBrakeCLI", config.handbrake.clone()),
                ("eject", config.eject.clone()),
            ],
            PlatformKind::Windows => vec![
                ("wsl", config.wsl.clone()),
                ("HandBrakeCLI", config.handbrake.clone()),
                ("cscript", config.script_host.clone()),
            ],
        };
        Self { tools }
    }

    /// Check every registered tool.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|(name, configured)| {
                let path = resolve(configured);
                ToolInfo {
                    name: name.to_string(),
                    available: path.is_some(),
                    configured: configured.clone(),
                    path,
                }
            })
            .collect()
    }

    /// Names of the registered tools that could not be found.
    pub fn missing(&self) -> Vec<&'static str> {
        self.tools
            .iter()
            .filter(|(_, configured)| resolve(configured).is_none())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Resolve a configured program: existing paths are used as-is, bare names
/// go through `PATH`.
fn resolve(configured: &Path) -> Option<PathBuf> {
    if configured.components().count() > 1 && configured.exists() {
        return Some(configured.to_path_buf());
    }
    which::which(configured).ok()
}
