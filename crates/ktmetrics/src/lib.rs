//! # ktmetrics
//!
//! **CLI Binary**
//!
//! This is the entry point for the `ktmetrics` command-line application.
//! It wires discovery, the metric pipeline and the renderers together.
//!
//! ## Responsibilities
//! * Parse command line arguments
//! * Load configuration
//! * Initialise logging and the worker pool
//! * Handle errors and exit codes
//!
//! This crate should contain minimal business logic.

mod error_hints;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ktmetrics_config::Cli;
use ktmetrics_format as format;
use ktmetrics_model::{SourceFile, analyze};
use ktmetrics_settings::{CONFIG_FILE_NAME, ScanOptions, Settings, TomlConfig};
use ktmetrics_syntax::KotlinParser;
use ktmetrics_types::MetricsReport;
use ktmetrics_walk as walk;

/// Render an error with its cause chain and any matching hints.
pub fn format_error(err: &anyhow::Error) -> String {
    error_hints::format(err)
}

/// Entry point used by the `ktmetrics` binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let settings = resolve_settings(&cli)?;
    debug!(?settings, "resolved settings");

    let report = with_pool(settings.threads, || analyze_paths(&settings))??;
    format::write_report(&report, settings.format, cli.out.as_deref())
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level one step from `warn`.
fn init_logging(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// CLI flags over the config file over built-in defaults.
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let base = match config_path(cli) {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            TomlConfig::from_file(&path)?.overlay(Settings::default())
        }
        None => Settings::default(),
    };
    Ok(cli.apply(base))
}

/// An explicit `--config` always counts, even if the file is missing. Otherwise
/// look next to the first scan path, then in the user config directory.
fn config_path(cli: &Cli) -> Option<PathBuf> {
    if cli.no_config {
        return None;
    }
    if let Some(path) = &cli.config {
        return Some(path.clone());
    }
    let first = cli
        .paths
        .first()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    TomlConfig::discover(&first).or_else(user_config_path)
}

fn user_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("ktmetrics").join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

/// Run `f` on a dedicated pool when a thread count is set, else on rayon's
/// global pool.
fn with_pool<T: Send>(threads: usize, f: impl FnOnce() -> T + Send) -> Result<T> {
    if threads == 0 {
        return Ok(f());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build worker thread pool")?;
    Ok(pool.install(f))
}

/// Discover, read and analyse every Kotlin file under the configured paths.
pub fn analyze_paths(settings: &Settings) -> Result<MetricsReport> {
    let roots: Vec<PathBuf> = settings.paths.iter().map(PathBuf::from).collect();
    let sources = collect_sources(&roots, &settings.scan)?;
    Ok(analyze(&sources, &KotlinParser, &settings.analysis))
}

/// A file that cannot be read becomes an unreadable source rather than
/// aborting the run.
fn collect_sources(roots: &[PathBuf], opts: &ScanOptions) -> Result<Vec<SourceFile>> {
    let files = walk::list_sources(roots, opts)?;
    Ok(files.iter().map(|path| load_source(path)).collect())
}

fn load_source(path: &Path) -> SourceFile {
    let display = walk::display_path(path);
    match walk::read_source(path) {
        Ok(text) => SourceFile::new(display, text),
        Err(err) => SourceFile::unreadable(display, format!("{err:#}")),
    }
}
