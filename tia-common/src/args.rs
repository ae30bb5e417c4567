//! Ordered argument contract for the spawned selection/execution process.
//!
//! Field order and flag spelling are part of the contract: the executor
//! parses positionally-dependent repeated flags and is never recompiled
//! together with this launcher, so the two sides share nothing but this
//! sequence.

use std::path::Path;

use crate::errors::{ConfigurationError, LaunchError};
use crate::patterns::ClassPattern;
use crate::types::{RevisionPoint, ScanPaths, ServerIdentity, TestSelectionFilter};

/// Build the full ordered argument list handed to the executor:
/// identity, revision window, agent control URL, the optional all-tests
/// override, filters, report destination, scan paths.
///
/// Validation runs before anything is emitted, so a configuration error
/// never reaches the spawn stage.
#[allow(clippy::too_many_arguments)]
pub fn build_selection_args(
    identity: &ServerIdentity,
    partition: &str,
    baseline: &RevisionPoint,
    end: &RevisionPoint,
    filter: &TestSelectionFilter,
    run_all_tests: bool,
    agent_url: &str,
    reports_dir: &Path,
    scan_paths: &ScanPaths,
) -> Result<Vec<String>, LaunchError> {
    identity.validate()?;
    if partition.trim().is_empty() {
        return Err(ConfigurationError::MissingField {
            field: "report.partition",
        }
        .into());
    }
    if scan_paths.is_empty() {
        return Err(ConfigurationError::EmptyScanPaths.into());
    }

    let mut args = vec![
        "--url".to_string(),
        identity.url.clone(),
        "--project".to_string(),
        identity.project.clone(),
        "--user".to_string(),
        identity.user.clone(),
        "--access-token".to_string(),
        identity.access_token.clone(),
        "--partition".to_string(),
        partition.to_string(),
        "--baseline".to_string(),
        baseline.to_string(),
        "--end".to_string(),
        end.to_string(),
        "--agent-url".to_string(),
        agent_url.to_string(),
    ];

    if run_all_tests {
        args.push("--all".to_string());
    }

    append_filters(&mut args, filter)?;

    args.push("--reports-dir".to_string());
    args.push(reports_dir.display().to_string());

    args.push("--scan-class-path".to_string());
    args.push(scan_paths.join());

    Ok(args)
}

fn append_filters(args: &mut Vec<String>, filter: &TestSelectionFilter) -> Result<(), LaunchError> {
    for tag in &filter.include_tags {
        args.push("-t".to_string());
        args.push(tag.clone());
    }
    for tag in &filter.exclude_tags {
        args.push("-T".to_string());
        args.push(tag.clone());
    }
    for engine in &filter.include_engines {
        args.push("-e".to_string());
        args.push(engine.clone());
    }
    for engine in &filter.exclude_engines {
        args.push("-E".to_string());
        args.push(engine.clone());
    }

    // The executor by default only considers classes ending in Test; an
    // explicit match-everything include keeps its candidate set aligned
    // with ours.
    if filter.include_classes.is_empty() {
        args.push("-n".to_string());
        args.push(ClassPattern::match_all().source().to_string());
    }
    for pattern in &filter.include_classes {
        args.push("-n".to_string());
        args.push(ClassPattern::compile(pattern)?.source().to_string());
    }
    for pattern in &filter.exclude_classes {
        args.push("-N".to_string());
        args.push(ClassPattern::compile(pattern)?.source().to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ServerIdentity {
        ServerIdentity {
            url: "https://ts.example".to_string(),
            project: "demo".to_string(),
            user: "u".to_string(),
            access_token: "t".to_string(),
        }
    }

    fn scan_paths() -> ScanPaths {
        ["build/classes/test", "build/resources/test"]
            .into_iter()
            .collect()
    }

    fn build(
        filter: &TestSelectionFilter,
        run_all_tests: bool,
    ) -> Result<Vec<String>, LaunchError> {
        build_selection_args(
            &identity(),
            "Unit Tests",
            &RevisionPoint::new("rev-100"),
            &RevisionPoint::new("rev-120"),
            filter,
            run_all_tests,
            "http://localhost:8123",
            Path::new("build/reports/testwise"),
            &scan_paths(),
        )
    }

    #[test]
    fn test_default_launch_argument_sequence() {
        let args = build(&TestSelectionFilter::default(), false).unwrap();
        let expected: Vec<String> = [
            "--url",
            "https://ts.example",
            "--project",
            "demo",
            "--user",
            "u",
            "--access-token",
            "t",
            "--partition",
            "Unit Tests",
            "--baseline",
            "rev-100",
            "--end",
            "rev-120",
            "--agent-url",
            "http://localhost:8123",
            "-n",
            ".*",
            "--reports-dir",
            "build/reports/testwise",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain([
            "--scan-class-path".to_string(),
            scan_paths().join(),
        ])
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_all_flag_sits_between_agent_url_and_filters() {
        let args = build(&TestSelectionFilter::default(), true).unwrap();
        let all_positions: Vec<usize> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "--all")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(all_positions.len(), 1);

        let agent_url_flag = args.iter().position(|a| a == "--agent-url").unwrap();
        let first_filter_flag = args.iter().position(|a| a == "-n").unwrap();
        assert!(agent_url_flag < all_positions[0]);
        assert!(all_positions[0] < first_filter_flag);
    }

    #[test]
    fn test_tag_includes_emit_one_pair_per_entry_in_input_order() {
        let filter = TestSelectionFilter {
            include_tags: vec!["fast".to_string(), "unit".to_string()],
            ..Default::default()
        };
        let args = build(&filter, false).unwrap();
        let pairs: Vec<(&str, &str)> = args
            .windows(2)
            .filter(|w| w[0] == "-t")
            .map(|w| (w[0].as_str(), w[1].as_str()))
            .collect();
        assert_eq!(pairs, vec![("-t", "fast"), ("-t", "unit")]);
    }

    #[test]
    fn test_each_filter_dimension_uses_its_own_flag() {
        let filter = TestSelectionFilter {
            include_tags: vec!["fast".to_string()],
            exclude_tags: vec!["slow".to_string()],
            include_engines: vec!["junit-jupiter".to_string()],
            exclude_engines: vec!["junit-vintage".to_string()],
            include_classes: vec!["com/example/*Test.class".to_string()],
            exclude_classes: vec!["com/example/Abstract*".to_string()],
        };
        let args = build(&filter, false).unwrap();

        for (flag, value) in [
            ("-t", "fast"),
            ("-T", "slow"),
            ("-e", "junit-jupiter"),
            ("-E", "junit-vintage"),
            ("-n", r"com\.example\.[^.]*Test"),
            ("-N", r"com\.example\.Abstract[^.]*"),
        ] {
            let flag_position = args.iter().position(|a| a == flag).unwrap();
            assert_eq!(args[flag_position + 1], value, "value after {flag}");
        }
    }

    #[test]
    fn test_empty_class_filter_still_emits_one_include() {
        let args = build(&TestSelectionFilter::default(), false).unwrap();
        let includes: Vec<&String> = args
            .windows(2)
            .filter(|w| w[0] == "-n")
            .map(|w| &w[1])
            .collect();
        assert_eq!(includes, vec![".*"]);
    }

    #[test]
    fn test_class_excludes_alone_keep_the_match_everything_include() {
        let filter = TestSelectionFilter {
            exclude_classes: vec!["*Slow*".to_string()],
            ..Default::default()
        };
        let args = build(&filter, false).unwrap();
        assert!(args.windows(2).any(|w| w[0] == "-n" && w[1] == ".*"));
        assert!(args.iter().any(|a| a == "-N"));
    }

    #[test]
    fn test_missing_identity_field_fails_before_emission() {
        let mut broken = identity();
        broken.project = String::new();
        let err = build_selection_args(
            &broken,
            "Unit Tests",
            &RevisionPoint::new("rev-100"),
            &RevisionPoint::new("rev-120"),
            &TestSelectionFilter::default(),
            false,
            "http://localhost:8123",
            Path::new("reports"),
            &scan_paths(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LaunchError::Configuration(ConfigurationError::MissingField {
                field: "server.project"
            })
        ));
    }

    #[test]
    fn test_empty_partition_is_rejected() {
        let err = build_selection_args(
            &identity(),
            " ",
            &RevisionPoint::new("rev-100"),
            &RevisionPoint::new("rev-120"),
            &TestSelectionFilter::default(),
            false,
            "http://localhost:8123",
            Path::new("reports"),
            &scan_paths(),
        )
        .unwrap_err();
        assert!(matches!(err, LaunchError::Configuration(_)));
    }

    #[test]
    fn test_empty_scan_paths_are_rejected() {
        let err = build_selection_args(
            &identity(),
            "Unit Tests",
            &RevisionPoint::new("rev-100"),
            &RevisionPoint::new("rev-120"),
            &TestSelectionFilter::default(),
            false,
            "http://localhost:8123",
            Path::new("reports"),
            &ScanPaths::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LaunchError::Configuration(ConfigurationError::EmptyScanPaths)
        ));
    }

    #[test]
    fn test_unparsable_class_pattern_surfaces_as_pattern_error() {
        let filter = TestSelectionFilter {
            include_classes: vec!["com.***.Test".to_string()],
            ..Default::default()
        };
        let err = build(&filter, false).unwrap_err();
        assert!(matches!(err, LaunchError::Pattern(_)));
        assert!(err.to_string().contains("com.***.Test"));
    }
}
