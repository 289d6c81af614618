//! Unified error type for the ripforge pipeline.
//!
//! Every stage funnels its failures into [`Error`]. None of them are retried;
//! the orchestrator aborts the current input and hands the error up to `main`.

use std::time::Duration;

/// Unified error type covering all failure modes in ripforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid configuration (output directory, title, inputs).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output of an external tool could not be understood.
    #[error("Parse error [{tool}]: {message}")]
    Parse {
        /// Name of the tool whose output failed to parse.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The disc reports the placeholder title and no override was given.
    #[error("Disc title is 'unknown'; provide a title for {input}")]
    UnknownTitle {
        /// The input whose title could not be resolved.
        input: String,
    },

    /// An external tool could not be spawned or exited unsuccessfully.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// A watchdog-guarded invocation did not finish in time.
    #[error("Timeout [{tool}]: no result after {after:?}")]
    Timeout {
        /// Name of the tool that was killed.
        tool: String,
        /// The budget that expired.
        after: Duration,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Short label for the error kind, used in log summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "configuration",
            Error::Parse { .. } => "parse",
            Error::UnknownTitle { .. } => "policy",
            Error::Tool { .. } => "external-process",
            Error::Timeout { .. } => "timeout",
            Error::Io { .. } => "io",
        }
    }

    /// Convenience constructor for [`Error::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Convenience constructor for [`Error::Parse`].
    pub fn parse(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Timeout`].
    pub fn timeout(tool: impl Into<String>, after: Duration) -> Self {
        Error::Timeout {
            tool: tool.into(),
            after,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
