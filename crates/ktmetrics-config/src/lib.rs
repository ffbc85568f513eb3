//! # ktmetrics-config
//!
//! **Tier 4 (Configuration)**
//!
//! This crate defines the CLI arguments and how they are layered over the
//! `ktmetrics.toml` file settings.
//!
//! ## What belongs here
//! * Clap `Parser` and `Args` structs
//! * Resolution of CLI flags over file settings
//!
//! ## What does NOT belong here
//! * Business logic
//! * I/O operations (file loading lives in ktmetrics-settings)
//! * Higher-tier crate dependencies

use std::path::PathBuf;

use clap::{Args, Parser};
pub use ktmetrics_settings::{AnalysisSettings, ScanOptions, Settings};
pub use ktmetrics_types::{NoavMode, OutputFormat};

/// `ktmetrics`: static quality metrics for Kotlin sources.
///
/// Prints one row per method with class and package aggregates, followed
/// by a TOTAL row.
#[derive(Parser, Debug)]
#[command(name = "ktmetrics", version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to scan. Defaults to the current directory.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub metrics: MetricArgs,

    /// Output format [default: md].
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write output to this file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Config file to load instead of `ktmetrics.toml` in the first path.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Don't load any config file.
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,

    /// Worker threads for per-file processing (0 = one per core).
    #[arg(long, short = 'j', value_name = "N")]
    pub threads: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Exclude pattern(s) using gitignore syntax. Repeatable.
    ///
    /// Examples:
    ///   --exclude build
    ///   --exclude "**/generated/**"
    #[arg(long = "exclude", visible_alias = "ignore", value_name = "PATTERN")]
    pub excluded: Vec<String>,

    /// Scan hidden files and directories.
    #[arg(long)]
    pub hidden: bool,

    /// Don't respect ignore files (.gitignore, .ignore, etc.).
    #[arg(long)]
    pub no_ignore: bool,

    /// Skip `.kts` script files.
    #[arg(long)]
    pub no_scripts: bool,

    /// Stop after this many files (0 = unlimited).
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Verbose output (repeat for more detail).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MetricArgs {
    /// How NOAV recognises attribute accesses [default: qualified].
    #[arg(long, value_enum)]
    pub noav: Option<NoavMode>,

    /// Replace each method's NOAV with the sum over all methods of the same name.
    #[arg(long)]
    pub noav_merge_by_name: bool,
}

impl Cli {
    /// Scan paths as given on the command line.
    pub fn path_strings(&self) -> Vec<String> {
        self.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    }

    /// Layer the flags given on the command line over `base`.
    ///
    /// Switches can only turn a setting on; excludes add to those from
    /// the config file.
    pub fn apply(&self, mut base: Settings) -> Settings {
        if !self.paths.is_empty() {
            base.paths = self.path_strings();
        }
        if let Some(format) = self.format {
            base.format = format;
        }
        if let Some(threads) = self.threads {
            base.threads = threads;
        }

        let g = &self.global;
        base.scan.exclude.extend(g.excluded.iter().cloned());
        base.scan.hidden |= g.hidden;
        base.scan.no_ignore |= g.no_ignore;
        if g.no_scripts {
            base.scan.include_scripts = false;
        }
        if let Some(max_files) = g.max_files {
            base.scan.max_files = max_files;
        }

        if let Some(noav) = self.metrics.noav {
            base.analysis.noav = noav;
        }
        base.analysis.noav_merge_by_name |= self.metrics.noav_merge_by_name;
        base
    }
}
