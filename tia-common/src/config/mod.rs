//! Configuration for the impacted-test launcher.
//!
//! All launch inputs are explicit values loaded from a TOML file, with a
//! small set of environment overrides; there is no process-wide default
//! instance. Validation runs as a separate pass so every problem is caught
//! before a launch is attempted.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::agent::AgentConfig;
use crate::errors::ConfigurationError;
use crate::types::{ScanPaths, ServerIdentity, TestSelectionFilter};

/// Environment variable overriding `server.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "TIA_ACCESS_TOKEN";

/// Launcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerIdentity,
    pub report: ReportConfig,
    pub agent: AgentConfig,
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub filter: TestSelectionFilter,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Partition the coverage and test details are attributed to.
    pub partition: String,
    /// Destination directory for the testwise reports.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
    /// Directory the coverage artifact lives in.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    /// Name scoping the coverage artifact within `artifact_dir`.
    #[serde(default = "default_run_name")]
    pub run_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Java executable used to start the executor (bare name or path).
    #[serde(default = "default_java")]
    pub java: PathBuf,
    /// Classpath entries for the executor and the tests under selection.
    #[serde(default)]
    pub classpath: Vec<PathBuf>,
    #[serde(default = "default_main_class")]
    pub main_class: String,
    /// Working directory of the spawned process. Mirrors the host test
    /// task's working directory so relative paths resolve like a normal
    /// test run.
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Output/class/resource directories across all build units.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("build/reports/testwise")
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("build/execdata")
}

fn default_run_name() -> String {
    "impacted-tests".to_string()
}

fn default_java() -> PathBuf {
    PathBuf::from("java")
}

fn default_main_class() -> String {
    "org.junit.platform.console.ImpactedTestsExecutor".to_string()
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Check everything that must hold before a launch is attempted.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.server.validate()?;
        if self.report.partition.trim().is_empty() {
            return Err(ConfigurationError::MissingField {
                field: "report.partition",
            });
        }
        self.agent.validate()?;
        if self.executor.classpath.is_empty() {
            return Err(ConfigurationError::EmptyClasspath);
        }
        if self.scan.paths.iter().all(|p| p.as_os_str().is_empty()) {
            return Err(ConfigurationError::EmptyScanPaths);
        }
        Ok(())
    }

    /// Ordered, de-duplicated scan paths; empty entries are skipped.
    pub fn scan_paths(&self) -> ScanPaths {
        self.scan.paths.iter().cloned().collect()
    }
}

/// Default config location: `~/.config/tia/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("tia").join("config.toml"))
}

/// Load configuration from `path`, or from the default location, and apply
/// environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigurationError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path().ok_or(ConfigurationError::MissingField {
            field: "config path",
        })?,
    };
    if !path.exists() {
        return Err(ConfigurationError::NotFound { path });
    }
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigurationError::Read {
            path: path.clone(),
            source,
        })?;
    let mut config: Config =
        toml::from_str(&content).map_err(|source| ConfigurationError::Parse {
            path: path.clone(),
            source,
        })?;
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(token) = env::var(ACCESS_TOKEN_ENV)
        && !token.is_empty()
    {
        config.server.access_token = token;
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    fn env_test_lock() -> MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: guarded by env_test_lock, no concurrent env access
        unsafe { env::set_var(key, value) };
    }

    fn remove_env(key: &str) {
        // SAFETY: guarded by env_test_lock, no concurrent env access
        unsafe { env::remove_var(key) };
    }

    const MINIMAL: &str = r#"
        [server]
        url = "https://ts.example"
        project = "demo"
        user = "u"
        access_token = "t"

        [report]
        partition = "Unit Tests"

        [agent]
        mode = "local"
        jar = "agents/coverage-agent.jar"
        port = 8123

        [executor]
        classpath = ["build/libs/executor.jar"]

        [scan]
        paths = ["build/classes/test"]
    "#;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config = parse(MINIMAL);
        assert_eq!(config.server.project, "demo");
        assert_eq!(config.report.reports_dir, default_reports_dir());
        assert_eq!(config.report.run_name, "impacted-tests");
        assert_eq!(config.executor.java, PathBuf::from("java"));
        assert_eq!(config.executor.main_class, default_main_class());
        assert!(config.filter.include_tags.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_agent_mode_is_a_tagged_variant() {
        let config = parse(MINIMAL);
        match &config.agent {
            AgentConfig::Local(local) => assert_eq!(local.port, 8123),
            AgentConfig::Remote { .. } => panic!("expected a local agent"),
        }

        let remote = MINIMAL.replace(
            "mode = \"local\"\n        jar = \"agents/coverage-agent.jar\"\n        port = 8123",
            "mode = \"remote\"\n        url = \"http://worker:9999\"",
        );
        let config = parse(&remote);
        assert!(matches!(config.agent, AgentConfig::Remote { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_control_port() {
        let broken = MINIMAL.replace("port = 8123", "port = 0");
        let err = parse(&broken).validate().unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidControlPort));
    }

    #[test]
    fn test_validate_rejects_empty_classpath() {
        let broken = MINIMAL.replace(
            "classpath = [\"build/libs/executor.jar\"]",
            "classpath = []",
        );
        let err = parse(&broken).validate().unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyClasspath));
    }

    #[test]
    fn test_validate_rejects_missing_scan_paths() {
        let broken = MINIMAL.replace("paths = [\"build/classes/test\"]", "paths = []");
        let err = parse(&broken).validate().unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyScanPaths));
    }

    #[test]
    fn test_env_var_overrides_access_token() {
        let _guard = env_test_lock();
        set_env(ACCESS_TOKEN_ENV, "from-env");
        let mut config = parse(MINIMAL);
        apply_env_overrides(&mut config);
        remove_env(ACCESS_TOKEN_ENV);
        assert_eq!(config.server.access_token, "from-env");
    }

    #[test]
    fn test_empty_env_var_does_not_clear_the_token() {
        let _guard = env_test_lock();
        set_env(ACCESS_TOKEN_ENV, "");
        let mut config = parse(MINIMAL);
        apply_env_overrides(&mut config);
        remove_env(ACCESS_TOKEN_ENV);
        assert_eq!(config.server.access_token, "t");
    }

    #[test]
    fn test_load_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigurationError::NotFound { .. }));
    }

    #[test]
    fn test_load_config_reads_a_file() {
        let _guard = env_test_lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.url, "https://ts.example");
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not toml [").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse { .. }));
    }
}
