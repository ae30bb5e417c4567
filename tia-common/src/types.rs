//! Core data model for one impacted-test launch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::errors::ConfigurationError;

/// Separator between entries of a path list, as the platform expects it.
pub const PATH_LIST_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// One endpoint of the revision window considered for impact analysis.
///
/// Holds the stable serialized form (a `branch:timestamp` descriptor or a
/// plain revision id) that is passed through to the spawned process
/// unchanged. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPoint(String);

impl RevisionPoint {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self(descriptor.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the analysis server that computes the impacted-test set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerIdentity {
    /// Server address.
    pub url: String,
    /// Project key on the server.
    pub project: String,
    /// Principal name.
    pub user: String,
    /// Access credential. May also be supplied via the environment, see
    /// [`crate::config::ACCESS_TOKEN_ENV`].
    #[serde(default)]
    pub access_token: String,
}

impl ServerIdentity {
    /// All fields are required; absence is a configuration error, not a
    /// runtime one.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let fields = [
            ("server.url", &self.url),
            ("server.project", &self.project),
            ("server.user", &self.user),
            ("server.access_token", &self.access_token),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigurationError::MissingField { field });
            }
        }
        Ok(())
    }
}

/// Include/exclude sets over the four independent filter dimensions.
///
/// Combination semantics (AND-of-ORs) live in the spawned process; this side
/// only serializes the sets. An empty include set means "no restriction",
/// except class-name includes, which are emitted as an explicit
/// match-everything pattern so the executor enumerates all candidate classes
/// rather than none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSelectionFilter {
    #[serde(default)]
    pub include_tags: Vec<String>,
    #[serde(default)]
    pub exclude_tags: Vec<String>,
    #[serde(default)]
    pub include_engines: Vec<String>,
    #[serde(default)]
    pub exclude_engines: Vec<String>,
    /// Class-name glob patterns, normalized before emission.
    #[serde(default)]
    pub include_classes: Vec<String>,
    #[serde(default)]
    pub exclude_classes: Vec<String>,
}

/// Ordered, de-duplicated directories containing compiled test artifacts and
/// resources, aggregated across all build units participating in the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPaths {
    entries: Vec<PathBuf>,
}

impl ScanPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directory, preserving first-seen order. Empty entries are
    /// skipped so absent resource directories never become empty path-list
    /// segments.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return;
        }
        if self.entries.contains(&path) {
            return;
        }
        self.entries.push(path);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Render as a single platform path-list string.
    pub fn join(&self) -> String {
        self.entries
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(PATH_LIST_SEPARATOR)
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for ScanPaths {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut paths = Self::new();
        for path in iter {
            paths.push(path);
        }
        paths
    }
}
