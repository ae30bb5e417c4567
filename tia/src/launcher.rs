//! Launch orchestration for the impacted-test executor process.
//!
//! One launch is prepared, spawned, and awaited to completion before another
//! may begin; the coverage artifact path is owned exclusively by the active
//! run. Nothing is shared with the spawned process by mutable reference;
//! communication happens through the argument vector, the artifact path and
//! the agent's control URL.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info, warn};

use tia_common::args::build_selection_args;
use tia_common::artifact::ExecutionArtifact;
use tia_common::config::Config;
use tia_common::errors::LaunchError;
use tia_common::types::{PATH_LIST_SEPARATOR, RevisionPoint};
use tia_common::util::render_command_line;

/// Lifecycle of one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Preparing,
    Running,
    Completed(i32),
    Failed,
}

/// Everything needed to start the executor process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// Resolved java executable.
    pub program: PathBuf,
    /// JVM arguments, carrying the agent directive in local mode.
    pub jvm_args: Vec<String>,
    pub classpath: Vec<PathBuf>,
    pub main_class: String,
    /// Program arguments per the selection contract.
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl LaunchPlan {
    fn classpath_argument(&self) -> String {
        self.classpath
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(PATH_LIST_SEPARATOR)
    }
}

/// Seam between orchestration and the operating system.
pub trait ProcessLauncher {
    fn launch(&mut self, plan: &LaunchPlan) -> io::Result<ExitStatus>;
}

/// Spawns the executor as a real child process and waits for it.
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&mut self, plan: &LaunchPlan) -> io::Result<ExitStatus> {
        Command::new(&plan.program)
            .args(&plan.jvm_args)
            .arg("-cp")
            .arg(plan.classpath_argument())
            .arg(&plan.main_class)
            .args(&plan.args)
            .current_dir(&plan.working_dir)
            .status()
    }
}

/// One launch request: the validated configuration plus the revision window.
pub struct LaunchRequest<'a> {
    pub config: &'a Config,
    pub baseline: RevisionPoint,
    pub end: RevisionPoint,
    /// Run all tests but still collect testwise coverage. The default path
    /// restricts execution to the impacted set.
    pub run_all_tests: bool,
}

/// Coordinates one impacted-test launch end to end.
pub struct LaunchOrchestrator<L> {
    launcher: L,
    state: LaunchState,
}

impl<L: ProcessLauncher> LaunchOrchestrator<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            state: LaunchState::Idle,
        }
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Run one launch to completion and forward the executor's exit code
    /// unchanged. A non-zero code means failing tests, not a launch failure.
    pub fn launch(&mut self, request: &LaunchRequest<'_>) -> Result<i32, LaunchError> {
        self.state = LaunchState::Preparing;
        let (plan, artifact) = match self.prepare(request) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.state = LaunchState::Failed;
                return Err(e);
            }
        };

        info!(
            "Starting impacted test executor: {}",
            render_command_line(&plan.program, &plan.args)
        );
        if !plan.jvm_args.is_empty() {
            info!("Starting agent with jvm args {:?}", plan.jvm_args);
        }
        debug!("Executor working dir {}", plan.working_dir.display());

        self.state = LaunchState::Running;
        match self.launcher.launch(&plan) {
            Ok(status) => {
                let code = status.code().unwrap_or(1);
                if !artifact.exists() {
                    warn!(
                        "Executor exited with {} but wrote no coverage data at {}",
                        code,
                        artifact.path().display()
                    );
                }
                self.state = LaunchState::Completed(code);
                Ok(code)
            }
            Err(e) => {
                self.state = LaunchState::Failed;
                Err(LaunchError::spawn(format!(
                    "{}: {e}",
                    plan.program.display()
                )))
            }
        }
    }

    fn prepare(
        &self,
        request: &LaunchRequest<'_>,
    ) -> Result<(LaunchPlan, ExecutionArtifact), LaunchError> {
        let config = request.config;
        config.validate()?;

        let artifact =
            ExecutionArtifact::resolve(&config.report.artifact_dir, &config.report.run_name);
        ensure_dir(&config.report.artifact_dir)?;
        ensure_dir(&config.report.reports_dir)?;
        artifact.reset().map_err(|e| {
            LaunchError::spawn(format!(
                "could not remove stale coverage artifact {}: {e}",
                artifact.path().display()
            ))
        })?;

        let jvm_args: Vec<String> = config
            .agent
            .jvm_argument(artifact.path(), &config.executor.working_dir)
            .into_iter()
            .collect();

        let args = build_selection_args(
            &config.server,
            &config.report.partition,
            &request.baseline,
            &request.end,
            &config.filter,
            request.run_all_tests,
            &config.agent.control_url(),
            &config.report.reports_dir,
            &config.scan_paths(),
        )?;

        let program = resolve_java(&config.executor.java)?;

        Ok((
            LaunchPlan {
                program,
                jvm_args,
                classpath: config.executor.classpath.clone(),
                main_class: config.executor.main_class.clone(),
                args,
                working_dir: config.executor.working_dir.clone(),
            },
            artifact,
        ))
    }
}

fn ensure_dir(dir: &Path) -> Result<(), LaunchError> {
    fs::create_dir_all(dir)
        .map_err(|e| LaunchError::spawn(format!("could not create {}: {e}", dir.display())))
}

/// Resolve the configured java executable. Bare names go through a PATH
/// lookup so a missing JVM is reported before the spawn attempt.
fn resolve_java(java: &Path) -> Result<PathBuf, LaunchError> {
    if java.is_absolute() || java.components().count() > 1 {
        return Ok(java.to_path_buf());
    }
    which::which(java).map_err(|e| {
        LaunchError::spawn(format!(
            "java executable '{}' not found: {e}",
            java.display()
        ))
    })
}
