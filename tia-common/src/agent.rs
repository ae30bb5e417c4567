//! Coverage-agent attachment.
//!
//! In local mode the orchestrator attaches the agent to the spawned process
//! via a `-javaagent` argument; in remote mode the agent is already running
//! in the target VM and a second attachment would conflict, so no directive
//! is produced. The distinction is a tagged variant so the no-directive path
//! is handled exhaustively by construction.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::errors::ConfigurationError;

/// How the coverage agent reaches the spawned process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AgentConfig {
    /// Agent jar attached by this launcher.
    Local(LocalAgentConfig),
    /// Agent already attached elsewhere; only its control URL is known.
    Remote { url: String },
}

/// Settings for a locally attached agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalAgentConfig {
    /// Path to the coverage agent jar.
    pub jar: PathBuf,
    /// Instrumentation include globs.
    #[serde(default)]
    pub includes: Vec<String>,
    /// Instrumentation exclude globs.
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Directory to dump instrumented classes into, when requested.
    #[serde(default)]
    pub class_dump_dir: Option<PathBuf>,
    /// Port of the control channel the spawned process signals test
    /// boundaries to. Required for per-test coverage attribution.
    pub port: u16,
}

impl AgentConfig {
    /// A zero control port would silently degrade attribution to whole-run
    /// granularity, so it is rejected as a configuration error.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            AgentConfig::Local(local) => {
                if local.jar.as_os_str().is_empty() {
                    return Err(ConfigurationError::MissingField { field: "agent.jar" });
                }
                if local.port == 0 {
                    return Err(ConfigurationError::InvalidControlPort);
                }
                Ok(())
            }
            AgentConfig::Remote { url } => {
                if url.trim().is_empty() {
                    return Err(ConfigurationError::MissingField { field: "agent.url" });
                }
                Ok(())
            }
        }
    }

    /// Address the spawned process signals test boundaries to. Present in
    /// both modes; the executor needs it regardless of who attached the
    /// agent.
    pub fn control_url(&self) -> String {
        match self {
            AgentConfig::Local(local) => format!("http://localhost:{}", local.port),
            AgentConfig::Remote { url } => url.clone(),
        }
    }

    /// The JVM argument attaching the agent, or `None` when it is
    /// pre-attached. The jar path is made relative to the working directory
    /// so the directive stays portable across machines with the same layout.
    pub fn jvm_argument(&self, execution_data: &Path, working_dir: &Path) -> Option<String> {
        let local = match self {
            AgentConfig::Local(local) => local,
            AgentConfig::Remote { .. } => return None,
        };

        let jar = relative_to(working_dir, &local.jar);
        let mut options = vec![format!("destfile={}", execution_data.display())];
        if !local.includes.is_empty() {
            options.push(format!("includes={}", local.includes.join(":")));
        }
        if !local.excludes.is_empty() {
            options.push(format!("excludes={}", local.excludes.join(":")));
        }
        if let Some(dir) = &local.class_dump_dir {
            options.push(format!("classdumpdir={}", dir.display()));
        }
        options.push(format!("http-server-port={}", local.port));

        Some(format!("-javaagent:{}={}", jar.display(), options.join(",")))
    }
}

/// Express `target` relative to `base`. Falls back to `target` unchanged
/// when no relative form exists (mixed absolute/relative inputs, or
/// absolute paths without a shared prefix).
fn relative_to(base: &Path, target: &Path) -> PathBuf {
    if base.is_absolute() != target.is_absolute() {
        return target.to_path_buf();
    }
    let base_parts: Vec<Component<'_>> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let target_parts: Vec<Component<'_>> = target
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 && base.is_absolute() {
        return target.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part);
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}
