//! Line-based size and complexity scanners.
//!
//! ## Cyclomatic Complexity
//!
//! Base complexity is 1. Each line whose trimmed text *starts with* a
//! control keyword (`if`, `for`, `while`, `when`, `catch`, `case`) adds 1.
//! The test is a plain prefix match, so `format(x)` counts as a `for`.
//!
//! ## Limitations
//!
//! - Identifiers that begin with a keyword count (`forEach`, `tryParse`, `cases`)
//! - Several keywords on one line count once (`if (a) x else if (b) y`)
//! - Keywords after other tokens are not counted (`val y = if (a) 1 else 2`)
//! - A block opened and closed on the same line never reaches the nesting stack
//! - `} else {` does not open a new nesting level

use crate::code_lines;

/// Keywords that add a decision point when they start a line.
pub const CONTROL_KEYWORDS: [&str; 6] = ["if", "for", "while", "when", "catch", "case"];

/// Keywords that open a nesting level when they start a line.
pub const NESTING_KEYWORDS: [&str; 7] = ["if", "for", "while", "catch", "when", "try", "else"];

/// Lines of code: newlines in the body plus one; 0 for an absent or empty body.
///
/// ```
/// use ktmetrics_scan::loc;
///
/// assert_eq!(loc(None), 0);
/// assert_eq!(loc(Some("a + b")), 1);
/// assert_eq!(loc(Some("{\n    return 1\n}")), 3);
/// ```
pub fn loc(body: Option<&str>) -> usize {
    match body {
        Some(b) if !b.is_empty() => b.matches('\n').count() + 1,
        _ => 0,
    }
}

/// Lexical cyclomatic complexity.
///
/// ```
/// use ktmetrics_scan::cyclomatic;
///
/// assert_eq!(cyclomatic("return a + b"), 1);
/// assert_eq!(cyclomatic("if (a) {\n    for (x in xs) {}\n}"), 3);
/// ```
pub fn cyclomatic(body: &str) -> usize {
    let decisions = body
        .lines()
        .map(str::trim)
        .filter(|line| CONTROL_KEYWORDS.iter().any(|kw| line.starts_with(kw)))
        .count();
    1 + decisions
}

/// Deepest stack of nesting keywords, popped by lines that are exactly `}`.
pub fn max_nesting(body: &str) -> usize {
    let mut depth = 0usize;
    let mut max_depth = 0usize;

    for line in body.lines().map(str::trim) {
        if NESTING_KEYWORDS.iter().any(|kw| line.starts_with(kw)) {
            depth += 1;
            max_depth = max_depth.max(depth);
        } else if line == "}" {
            depth = depth.saturating_sub(1);
        }
    }

    max_depth
}

/// Weight of Class: each method's share of the class's total CC.
///
/// All zeros when the total is 0 (including the empty class).
pub fn woc(ccs: &[usize]) -> Vec<f64> {
    let total: usize = ccs.iter().sum();
    if total == 0 {
        return vec![0.0; ccs.len()];
    }
    ccs.iter().map(|&cc| cc as f64 / total as f64).collect()
}

/// WOC for a free function, which has no siblings to normalise against.
pub fn top_level_woc(cc: usize) -> f64 {
    if cc > 0 { 1.0 } else { 0.0 }
}

/// Maximum Message Chain Length.
///
/// Each code line is split on `.`; from the second segment on, consecutive
/// segments containing both `(` and `)` are counted as chained calls. A
/// segment that is not a call breaks the chain and the line scores 0, so
/// only lines ending on a call count. The result is the longest chain over
/// all lines.
///
/// ```
/// use ktmetrics_scan::mamcl;
///
/// assert_eq!(mamcl("a.b().c().d()"), 3);
/// assert_eq!(mamcl("val n = list.map(f).size"), 0);
/// assert_eq!(mamcl("val x = 1"), 0);
/// ```
pub fn mamcl(body: &str) -> usize {
    code_lines(body).map(chain_length).max().unwrap_or(0)
}

fn chain_length(line: &str) -> usize {
    let mut calls = 0;
    for seg in line.split('.').skip(1) {
        if !(seg.contains('(') && seg.contains(')')) {
            return 0;
        }
        calls += 1;
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loc_counts_newlines_plus_one() {
        assert_eq!(loc(Some("")), 0);
        assert_eq!(loc(Some("x")), 1);
        assert_eq!(loc(Some("a\nb\n")), 3);
    }

    #[test]
    fn cc_counts_line_leading_keywords() {
        let body = "{\n    if (a) {\n        return 1\n    }\n    while (b) {}\n    when (c) {\n        1 -> x()\n    }\n}";
        assert_eq!(cyclomatic(body), 4);
    }

    #[test]
    fn cc_ignores_mid_line_keywords() {
        assert_eq!(cyclomatic("val y = if (a) 1 else 2"), 1);
        assert_eq!(cyclomatic("xs.forEach { }"), 1);
    }

    #[test]
    fn keyword_prefix_counts_without_word_boundary() {
        assert_eq!(cyclomatic("format(x)"), 2);
        assert_eq!(cyclomatic("cases.add(c)"), 2);
        assert_eq!(max_nesting("tryParse()"), 1);
        assert_eq!(max_nesting("forEach {\n}\nif (a) {\n}"), 1);
    }

    #[test]
    fn cc_counts_try_catch() {
        let body = "{\n    try {\n        risky()\n    }\n    catch (e: Exception) {\n    }\n}";
        assert_eq!(cyclomatic(body), 2);
    }

    #[test]
    fn cc_counts_one_per_line() {
        assert_eq!(cyclomatic("if (a) if (b) c()"), 2);
    }

    #[test]
    fn nesting_tracks_stack() {
        let body = "{\n    if (a) {\n        for (x in xs) {\n            print(x)\n        }\n    }\n    while (b) {\n    }\n}";
        assert_eq!(max_nesting(body), 2);
    }

    #[test]
    fn nesting_zero_without_keywords() {
        assert_eq!(max_nesting("{\n    return a + b\n}"), 0);
    }

    #[test]
    fn nesting_closing_brace_on_empty_stack_is_ignored() {
        assert_eq!(max_nesting("}\n}\nif (a) {\n}"), 1);
    }

    #[test]
    fn nesting_else_pushes() {
        let body = "if (a) {\n}\nelse {\n    try {\n    }\n}";
        assert_eq!(max_nesting(body), 2);
    }

    #[test]
    fn woc_normalises() {
        assert_eq!(woc(&[1, 1]), vec![0.5, 0.5]);
        assert_eq!(woc(&[1, 3]), vec![0.25, 0.75]);
        assert_eq!(woc(&[0, 0]), vec![0.0, 0.0]);
        assert!(woc(&[]).is_empty());
    }

    #[test]
    fn top_level_woc_is_binary() {
        assert_eq!(top_level_woc(3), 1.0);
        assert_eq!(top_level_woc(0), 0.0);
    }

    #[test]
    fn chain_broken_by_non_call_scores_zero() {
        assert_eq!(mamcl("list.map(f).size"), 0);
        assert_eq!(mamcl("x.foo().let { it }"), 0);
        assert_eq!(mamcl("a.b.c()"), 0);
        assert_eq!(mamcl("builder.a().b().c().d().build()"), 5);
    }

    #[test]
    fn broken_line_does_not_hide_longer_chain() {
        assert_eq!(mamcl("val n = xs.map(f).size\nys.a().b()"), 2);
    }

    #[test]
    fn chain_takes_max_over_lines() {
        assert_eq!(mamcl("x.a()\ny.a().b()\n"), 2);
    }

    #[test]
    fn chain_skips_comment_lines() {
        assert_eq!(mamcl("// a.b().c().d()\nx()"), 0);
    }
}
