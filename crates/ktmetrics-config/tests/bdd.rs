//! BDD-style scenario tests for ktmetrics-config.
//!
//! Each test follows Given/When/Then structure covering:
//! - Argument parsing and defaults
//! - Enum values accepted on the command line
//! - Layering CLI flags over file settings

use std::path::PathBuf;

use clap::Parser;
use ktmetrics_config::{Cli, NoavMode, OutputFormat, Settings};
use ktmetrics_settings::TomlConfig;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["ktmetrics"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("arguments should parse")
}

// ============================================================================
// Scenario: parsing
// ============================================================================

mod given_no_arguments {
    use super::*;

    #[test]
    fn when_parsed_then_nothing_is_set() {
        let cli = parse(&[]);
        assert!(cli.paths.is_empty());
        assert_eq!(cli.format, None);
        assert_eq!(cli.metrics.noav, None);
        assert_eq!(cli.global.verbose, 0);
        assert!(cli.out.is_none());
    }

    #[test]
    fn when_applied_then_defaults_survive() {
        let settings = parse(&[]).apply(Settings::default());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.paths, vec!["."]);
    }
}

mod given_full_command_line {
    use super::*;

    #[test]
    fn when_parsed_then_every_flag_is_read() {
        let cli = parse(&[
            "src",
            "lib/Main.kt",
            "--format",
            "jsonl",
            "--noav",
            "broad",
            "--noav-merge-by-name",
            "--exclude",
            "build",
            "--ignore",
            "generated",
            "--hidden",
            "--no-ignore",
            "--no-scripts",
            "--max-files",
            "10",
            "-j",
            "2",
            "--out",
            "report.jsonl",
            "-vv",
        ]);
        assert_eq!(
            cli.paths,
            vec![PathBuf::from("src"), PathBuf::from("lib/Main.kt")]
        );
        assert_eq!(cli.format, Some(OutputFormat::Jsonl));
        assert_eq!(cli.metrics.noav, Some(NoavMode::Broad));
        assert!(cli.metrics.noav_merge_by_name);
        assert_eq!(cli.global.excluded, vec!["build", "generated"]);
        assert!(cli.global.hidden && cli.global.no_ignore && cli.global.no_scripts);
        assert_eq!(cli.global.max_files, Some(10));
        assert_eq!(cli.threads, Some(2));
        assert_eq!(cli.out, Some(PathBuf::from("report.jsonl")));
        assert_eq!(cli.global.verbose, 2);
    }
}

mod given_bad_arguments {
    use super::*;

    #[test]
    fn when_format_unknown_then_parse_fails() {
        assert!(Cli::try_parse_from(["ktmetrics", "--format", "xml"]).is_err());
    }

    #[test]
    fn when_config_and_no_config_then_parse_fails() {
        assert!(
            Cli::try_parse_from(["ktmetrics", "--config", "a.toml", "--no-config"]).is_err()
        );
    }
}

// ============================================================================
// Scenario: precedence CLI > file > defaults
// ============================================================================

mod given_a_config_file {
    use super::*;

    fn file_settings() -> Settings {
        let toml = r#"
format = "csv"
noav = "broad"
exclude = ["build"]
max_files = 50
threads = 4
include_scripts = false
"#;
        TomlConfig::parse(toml).unwrap().overlay(Settings::default())
    }

    #[test]
    fn when_cli_is_silent_then_file_values_hold() {
        let settings = parse(&[]).apply(file_settings());
        assert_eq!(settings.format, OutputFormat::Csv);
        assert_eq!(settings.analysis.noav, NoavMode::Broad);
        assert_eq!(settings.scan.max_files, 50);
        assert_eq!(settings.threads, 4);
        assert!(!settings.scan.include_scripts);
    }

    #[test]
    fn when_cli_sets_values_then_cli_wins() {
        let settings = parse(&[
            "--format",
            "json",
            "--noav",
            "qualified",
            "--max-files",
            "0",
            "--threads",
            "1",
            "app",
        ])
        .apply(file_settings());
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.analysis.noav, NoavMode::Qualified);
        assert_eq!(settings.scan.max_files, 0);
        assert_eq!(settings.threads, 1);
        assert_eq!(settings.paths, vec!["app"]);
    }

    #[test]
    fn when_cli_adds_excludes_then_both_apply() {
        let settings = parse(&["--exclude", "out"]).apply(file_settings());
        assert_eq!(settings.scan.exclude, vec!["build", "out"]);
    }
}
