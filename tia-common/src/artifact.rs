//! Lifecycle of the coverage-output artifact for one run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The single file the coverage agent writes execution data to.
///
/// Owned exclusively by the orchestrator for the duration of one run. A file
/// already present at the path is stale output of an earlier run and must be
/// removed before launch; presence after the run signals that the spawned
/// process produced coverage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionArtifact {
    path: PathBuf,
}

impl ExecutionArtifact {
    /// Canonical run-scoped output path: `<artifact_dir>/<run_name>.exec`.
    /// Deterministic for a given configuration.
    pub fn resolve(artifact_dir: &Path, run_name: &str) -> Self {
        Self {
            path: artifact_dir.join(format!("{run_name}.exec")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove stale execution data. Absence of the file is not an error;
    /// any other failure propagates, since launching over a dirty artifact
    /// path would misattribute a previous run's output to this one.
    pub fn reset(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed old execution data at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Whether the spawned process wrote coverage output.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
