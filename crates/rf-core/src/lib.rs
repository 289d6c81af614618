//! rf-core: shared errors, configuration, and disc domain types.
//!
//! This crate is the foundational dependency for the other ripforge crates.

pub mod config;
pub mod disc;
pub mod error;

// Re-export the most commonly used items at the crate root.
pub use config::{Config, EncodeConfig, ToolsConfig};
pub use disc::{capitalize, DiscDocument, DiscTitle, Track};
pub use error::{Error, Result};
