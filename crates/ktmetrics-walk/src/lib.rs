//! # ktmetrics-walk
//!
//! **Tier 2 (Utilities)**
//!
//! Kotlin source discovery. Walks scan roots with gitignore support and
//! reads the files it finds into `(path, text)` pairs for the pipeline.
//!
//! ## What belongs here
//! * Filesystem traversal respecting gitignore and exclude patterns
//! * Kotlin file recognition (`.kt`, `.kts`)
//! * Reading file text
//!
//! ## What does NOT belong here
//! * Parsing or metric computation
//! * File modification

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use ktmetrics_settings::ScanOptions;
use tracing::{debug, info};

/// True for `.kt` files, and `.kts` scripts when `include_scripts` is set.
pub fn is_kotlin_source(path: &Path, include_scripts: bool) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some("kt") => true,
        Some("kts") => include_scripts,
        _ => false,
    }
}

/// List Kotlin files under each root, in root order and sorted within a root.
///
/// A root that is itself a Kotlin file is listed as given. A root that does
/// not exist is an error. `max_files` (0 = unlimited) caps the combined list.
pub fn list_sources(roots: &[PathBuf], opts: &ScanOptions) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for root in roots {
        if !root.exists() {
            bail!("Path not found: {}", root.display());
        }
        if root.is_file() {
            if is_kotlin_source(root, opts.include_scripts) {
                files.push(root.clone());
            } else {
                debug!(path = %root.display(), "skipping non-Kotlin file root");
            }
        } else {
            let mut found = walk_root(root, opts)?;
            found.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
            debug!(root = %root.display(), files = found.len(), "walked root");
            files.extend(found);
        }

        if opts.max_files > 0 && files.len() >= opts.max_files {
            files.truncate(opts.max_files);
            break;
        }
    }

    info!(files = files.len(), "discovered Kotlin sources");
    Ok(files)
}

fn walk_root(root: &Path, opts: &ScanOptions) -> Result<Vec<PathBuf>> {
    let mut builder = WalkBuilder::new(root);
    builder.hidden(!opts.hidden);
    builder.follow_links(false);
    builder.require_git(false);
    if opts.no_ignore {
        builder.ignore(false);
        builder.git_ignore(false);
        builder.git_exclude(false);
        builder.git_global(false);
        builder.parents(false);
    } else {
        builder.git_ignore(true);
        builder.git_exclude(true);
        builder.git_global(true);
    }
    builder.overrides(exclude_overrides(root, &opts.exclude)?);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if is_kotlin_source(entry.path(), opts.include_scripts) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Exclude patterns use gitignore syntax; as overrides they are negated globs.
fn exclude_overrides(root: &Path, patterns: &[String]) -> Result<Override> {
    let mut builder = OverrideBuilder::new(root);
    for pattern in patterns {
        builder
            .add(&format!("!{pattern}"))
            .with_context(|| format!("Invalid exclude pattern: {pattern}"))?;
    }
    builder.build().context("Failed to build exclude patterns")
}

/// Path with forward slashes, for display and row context.
pub fn display_path(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    s.strip_prefix("./").map(str::to_string).unwrap_or(s)
}

/// Read one source file. Invalid UTF-8 is replaced rather than rejected.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kotlin_extensions() {
        assert!(is_kotlin_source(Path::new("a/B.kt"), false));
        assert!(is_kotlin_source(Path::new("build.gradle.kts"), true));
        assert!(!is_kotlin_source(Path::new("build.gradle.kts"), false));
        assert!(!is_kotlin_source(Path::new("Main.java"), true));
        assert!(!is_kotlin_source(Path::new("kt"), true));
    }

    #[test]
    fn display_path_normalizes() {
        assert_eq!(display_path(Path::new("./src/A.kt")), "src/A.kt");
        assert_eq!(display_path(Path::new(r"src\A.kt")), "src/A.kt");
        assert_eq!(display_path(Path::new("/abs/A.kt")), "/abs/A.kt");
    }

    #[test]
    fn bad_exclude_pattern_is_error() {
        let dir = std::env::temp_dir();
        assert!(exclude_overrides(&dir, &["a[".to_string()]).is_err());
    }
}
