//! # ktmetrics-scan
//!
//! **Tier 1 (Lexical Scanners)**
//!
//! Pure functions from raw method-body text to scalar metrics. Every
//! scanner reads the body as a sequence of lines; none of them build a
//! syntax tree, resolve names, or touch the filesystem.
//!
//! ## What belongs here
//! * Line-based metrics: LOC, CC, nesting depth, message chains
//! * Name-based metrics: accessed attributes (NOAV), method coupling (CM)
//! * WOC normalisation over a class's CC values
//!
//! ## What does NOT belong here
//! * Declaration extraction (use ktmetrics-syntax)
//! * Class/package aggregation (use ktmetrics-model)

pub mod complexity;
pub mod references;

pub use complexity::{
    CONTROL_KEYWORDS, NESTING_KEYWORDS, cyclomatic, loc, mamcl, max_nesting, top_level_woc, woc,
};
pub use references::{KEYWORDS, called_names, coupling, noav, referenced_attributes};

/// Prefixes that mark a method as an accessor.
pub const ACCESSOR_PREFIXES: [&str; 3] = ["get", "set", "is"];

/// Accessors are excluded from every non-accessor (NAMM) count.
///
/// ```
/// use ktmetrics_scan::is_accessor;
///
/// assert!(is_accessor("getValue"));
/// assert!(is_accessor("isEmpty"));
/// assert!(!is_accessor("add"));
/// ```
pub fn is_accessor(name: &str) -> bool {
    ACCESSOR_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Check if a trimmed line is a comment line.
pub fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with("*/")
}

/// Lines that carry code: non-blank and not comment lines, trimmed.
pub(crate) fn code_lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !is_comment_line(l))
}
