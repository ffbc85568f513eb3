//! # ktmetrics-settings
//!
//! **Tier 0 (Pure Settings)**
//!
//! Clap-free settings types for the walk, model and format layers, plus the
//! `ktmetrics.toml` file schema. These types mirror CLI arguments without
//! Clap dependencies, so lower tiers depend on this instead of
//! `ktmetrics-config`.
//!
//! ## What belongs here
//! * Pure data types with Serde derive
//! * Default values
//! * `ktmetrics.toml` parsing and overlay onto defaults
//!
//! ## What does NOT belong here
//! * Clap parsing (use ktmetrics-config)
//! * Directory traversal
//! * Business logic

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ktmetrics_types::{NoavMode, OutputFormat};

/// File name looked up in the first scanned directory.
pub const CONFIG_FILE_NAME: &str = "ktmetrics.toml";

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// File discovery options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Gitignore-style patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Walk hidden files and directories.
    #[serde(default)]
    pub hidden: bool,

    /// Don't respect ignore files (.gitignore, .ignore, etc.).
    #[serde(default)]
    pub no_ignore: bool,

    /// Include `.kts` script files alongside `.kt`.
    #[serde(default = "default_true")]
    pub include_scripts: bool,

    /// Stop after this many files (0 = unlimited).
    #[serde(default)]
    pub max_files: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            hidden: false,
            no_ignore: false,
            include_scripts: true,
            max_files: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Metric computation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// How attribute accesses are recognised.
    #[serde(default)]
    pub noav: NoavMode,

    /// Replace each record's NOAV with the sum over records sharing its
    /// method name.
    #[serde(default)]
    pub noav_merge_by_name: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Paths to scan (defaults to `["."]`).
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,

    #[serde(default)]
    pub format: OutputFormat,

    /// Rayon worker count (0 = rayon default).
    #[serde(default)]
    pub threads: usize,

    #[serde(flatten)]
    pub scan: ScanOptions,

    #[serde(flatten)]
    pub analysis: AnalysisSettings,
}

fn default_paths() -> Vec<String> {
    vec![".".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            format: OutputFormat::default(),
            threads: 0,
            scan: ScanOptions::default(),
            analysis: AnalysisSettings::default(),
        }
    }
}

/// `ktmetrics.toml` schema. Every key is optional; absent keys leave the
/// underlying setting unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub format: Option<OutputFormat>,
    pub noav: Option<NoavMode>,
    pub noav_merge_by_name: Option<bool>,
    pub include_scripts: Option<bool>,
    pub exclude: Option<Vec<String>>,
    pub hidden: Option<bool>,
    pub no_ignore: Option<bool>,
    pub max_files: Option<usize>,
    pub threads: Option<usize>,
}

impl TomlConfig {
    /// Load configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load configuration from a file path.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find `ktmetrics.toml` for a scan root: inside it when it is a
    /// directory, next to it when it is a file.
    pub fn discover(root: &Path) -> Option<PathBuf> {
        let dir = if root.is_dir() { root } else { root.parent()? };
        let candidate = dir.join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }

    /// Apply the keys present in this file on top of `base`.
    pub fn overlay(&self, mut base: Settings) -> Settings {
        if let Some(format) = self.format {
            base.format = format;
        }
        if let Some(noav) = self.noav {
            base.analysis.noav = noav;
        }
        if let Some(merge) = self.noav_merge_by_name {
            base.analysis.noav_merge_by_name = merge;
        }
        if let Some(scripts) = self.include_scripts {
            base.scan.include_scripts = scripts;
        }
        if let Some(exclude) = &self.exclude {
            base.scan.exclude = exclude.clone();
        }
        if let Some(hidden) = self.hidden {
            base.scan.hidden = hidden;
        }
        if let Some(no_ignore) = self.no_ignore {
            base.scan.no_ignore = no_ignore;
        }
        if let Some(max_files) = self.max_files {
            base.scan.max_files = max_files;
        }
        if let Some(threads) = self.threads {
            base.threads = threads;
        }
        base
    }
}
