//! # rf-av
//!
//! External tool plumbing for the ripforge pipeline.
//!
//! This crate provides:
//!
//! - **Command execution** ([`ToolCommand`]) -- async builder with optional
//!   watchdog for running external processes.
//! - **Tool discovery** ([`ToolRegistry`]) -- which of lsdvd, HandBrakeCLI,
//!   eject (or WSL and the script host) are reachable.
//! - **Metadata extraction** ([`MetadataExtractor`]) -- lsdvd output to a
//!   titled [`rf_core::DiscDocument`].
//! - **Transcoding** ([`HandBrake`]) -- [`Transcoder`] implementation that
//!   builds and runs HandBrakeCLI jobs.
//! - **Platforms** ([`Platform`]) -- Unix and Windows inspection and eject.

pub mod command;
pub mod encode;
pub mod inspect;
pub mod platform;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use encode::{format_elapsed, EncodeJob, HandBrake, Transcoder};
pub use inspect::MetadataExtractor;
pub use platform::{Inspection, Platform, PlatformKind, UnixPlatform, WindowsPlatform};
pub use tools::{ToolInfo, ToolRegistry};
