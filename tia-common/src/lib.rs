//! Shared building blocks for the impacted-test launcher.
//!
//! Everything the `tia` CLI needs to assemble one launch of the external
//! selection/execution process: the data model for the revision window and
//! filters, class-name pattern normalization, the coverage-artifact
//! lifecycle, the agent attachment directive, the ordered argument contract,
//! and configuration loading.

pub mod agent;
pub mod args;
pub mod artifact;
pub mod config;
pub mod errors;
pub mod patterns;
pub mod types;
pub mod util;

pub use agent::{AgentConfig, LocalAgentConfig};
pub use args::build_selection_args;
pub use artifact::ExecutionArtifact;
pub use config::{Config, load_config};
pub use errors::{ConfigurationError, LaunchError};
pub use patterns::{ClassPattern, PatternError, normalize};
pub use types::{
    PATH_LIST_SEPARATOR, RevisionPoint, ScanPaths, ServerIdentity, TestSelectionFilter,
};
