//! Error taxonomy for the impacted-test launcher.
//!
//! All variants are fatal and surfaced before or at process spawn. Failing
//! tests inside the spawned executor are not errors of this layer; they are
//! reported through the forwarded exit status and the coverage artifact.

use std::path::PathBuf;
use thiserror::Error;

use crate::patterns::PatternError;

/// Invalid or incomplete launch configuration, detected before any process
/// is spawned.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A required field is absent or empty.
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },

    /// The agent control port is zero. Without a reachable control channel
    /// the agent cannot attribute coverage per test case.
    #[error("agent control port must be non-zero")]
    InvalidControlPort,

    /// The executor classpath has no entries.
    #[error("executor classpath is empty")]
    EmptyClasspath,

    /// No scan paths were configured; the executor would enumerate no
    /// candidate test classes.
    #[error("no scan paths configured")]
    EmptyScanPaths,

    /// Configuration file does not exist.
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file contains invalid TOML.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level failure of one launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The executor process could not be started, or the run could not be
    /// brought into a startable state. Distinct from a failing test run,
    /// which is forwarded via the exit status.
    #[error("failed to launch impacted test executor: {reason}")]
    Spawn { reason: String },
}

impl LaunchError {
    /// Build a spawn failure from any displayable reason.
    pub fn spawn(reason: impl Into<String>) -> Self {
        Self::Spawn {
            reason: reason.into(),
        }
    }
}
