//! Tests for Kotlin source discovery.

use std::fs;
use std::path::{Path, PathBuf};

use ktmetrics_settings::ScanOptions;
use ktmetrics_walk::{display_path, list_sources, read_source};
use tempfile::TempDir;

fn touch(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|f| display_path(f.strip_prefix(root).unwrap()))
        .collect()
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    touch(root, "src/main/App.kt", "package app\n");
    touch(root, "src/main/util/Strings.kt", "package app.util\n");
    touch(root, "build.gradle.kts", "plugins {}\n");
    touch(root, "src/main/Legacy.java", "class Legacy {}\n");
    touch(root, "README.md", "# readme\n");
    dir
}

#[test]
fn lists_kotlin_sources_sorted() {
    let dir = fixture();
    let files = list_sources(&[dir.path().to_path_buf()], &ScanOptions::default()).unwrap();
    assert_eq!(
        names(dir.path(), &files),
        vec!["build.gradle.kts", "src/main/App.kt", "src/main/util/Strings.kt"]
    );
}

#[test]
fn scripts_can_be_left_out() {
    let dir = fixture();
    let opts = ScanOptions {
        include_scripts: false,
        ..Default::default()
    };
    let files = list_sources(&[dir.path().to_path_buf()], &opts).unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.extension().unwrap() == "kt"));
}

#[test]
fn exclude_patterns_apply() {
    let dir = fixture();
    let opts = ScanOptions {
        exclude: vec!["util".to_string()],
        ..Default::default()
    };
    let files = list_sources(&[dir.path().to_path_buf()], &opts).unwrap();
    assert_eq!(
        names(dir.path(), &files),
        vec!["build.gradle.kts", "src/main/App.kt"]
    );
}

#[test]
fn gitignore_is_respected_unless_disabled() {
    let dir = fixture();
    touch(dir.path(), ".gitignore", "generated/\n");
    touch(dir.path(), "generated/Gen.kt", "package gen\n");

    let files = list_sources(&[dir.path().to_path_buf()], &ScanOptions::default()).unwrap();
    assert!(!names(dir.path(), &files).iter().any(|n| n.starts_with("generated")));

    let opts = ScanOptions {
        no_ignore: true,
        ..Default::default()
    };
    let files = list_sources(&[dir.path().to_path_buf()], &opts).unwrap();
    assert!(names(dir.path(), &files).contains(&"generated/Gen.kt".to_string()));
}

#[test]
fn hidden_directories_need_opt_in() {
    let dir = fixture();
    touch(dir.path(), ".hidden/Secret.kt", "package secret\n");

    let files = list_sources(&[dir.path().to_path_buf()], &ScanOptions::default()).unwrap();
    assert_eq!(files.len(), 3);

    let opts = ScanOptions {
        hidden: true,
        ..Default::default()
    };
    let files = list_sources(&[dir.path().to_path_buf()], &opts).unwrap();
    assert_eq!(files.len(), 4);
}

#[test]
fn max_files_caps_across_roots() {
    let dir = fixture();
    let opts = ScanOptions {
        max_files: 2,
        ..Default::default()
    };
    let roots = vec![dir.path().to_path_buf(), dir.path().join("src")];
    let files = list_sources(&roots, &opts).unwrap();
    assert_eq!(files.len(), 2);
}

#[test]
fn file_root_is_listed_directly() {
    let dir = fixture();
    let file = dir.path().join("src/main/App.kt");
    let files = list_sources(std::slice::from_ref(&file), &ScanOptions::default()).unwrap();
    assert_eq!(files, vec![file]);

    let readme = dir.path().join("README.md");
    assert!(list_sources(&[readme], &ScanOptions::default()).unwrap().is_empty());
}

#[test]
fn missing_root_is_error() {
    let dir = TempDir::new().unwrap();
    let err = list_sources(&[dir.path().join("nope")], &ScanOptions::default()).unwrap_err();
    assert!(err.to_string().contains("Path not found"));
}

#[test]
fn empty_directory_lists_nothing() {
    let dir = TempDir::new().unwrap();
    let files = list_sources(&[dir.path().to_path_buf()], &ScanOptions::default()).unwrap();
    assert!(files.is_empty());
}

#[test]
fn read_source_replaces_invalid_utf8() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Bad.kt");
    fs::write(&path, b"val s = \"\xff\"\n").unwrap();
    let text = read_source(&path).unwrap();
    assert!(text.contains('\u{FFFD}'));
}

#[test]
fn read_source_missing_file_has_context() {
    let dir = TempDir::new().unwrap();
    let err = read_source(&dir.path().join("Gone.kt")).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read"));
}
