//! Name-based scanners: accessed attributes (NOAV) and method coupling (CM).
//!
//! Both work on identifiers found in code lines of a body. Neither resolves
//! scopes, so a local variable that shadows a property still counts as an
//! access in [`NoavMode::Broad`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use ktmetrics_types::NoavMode;
use regex::Regex;

use crate::code_lines;

/// Identifiers never treated as attribute references.
pub const KEYWORDS: [&str; 29] = [
    "if",
    "for",
    "while",
    "when",
    "catch",
    "case",
    "else",
    "return",
    "val",
    "var",
    "fun",
    "true",
    "false",
    "null",
    "override",
    "private",
    "public",
    "protected",
    "internal",
    "class",
    "object",
    "interface",
    "companion",
    "constructor",
    "init",
    "super",
    "this",
    "in",
    "is",
];

// `this.x`, `this?.x`, `this!!.x`
static SELF_ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bthis\s*(?:\?|!!)?\.\s*([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex literal")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("valid regex literal"));

// a name followed by an argument list
static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid regex literal")
});

/// Attribute names a body refers to, before intersecting with declarations.
pub fn referenced_attributes(body: &str, mode: NoavMode) -> BTreeSet<&str> {
    let mut names = BTreeSet::new();
    for line in code_lines(body) {
        names.extend(
            SELF_ACCESS
                .captures_iter(line)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str()),
        );
        if mode == NoavMode::Broad {
            names.extend(bare_identifiers(line));
        }
    }
    names
}

/// Identifiers that are neither member selections (`x.name`) nor calls
/// (`name(`), minus keywords.
fn bare_identifiers(line: &str) -> impl Iterator<Item = &str> {
    let bytes = line.as_bytes();
    IDENTIFIER.find_iter(line).filter_map(move |m| {
        if m.start() > 0 && bytes[m.start() - 1] == b'.' {
            return None;
        }
        if line[m.end()..].starts_with('(') || KEYWORDS.contains(&m.as_str()) {
            return None;
        }
        Some(m.as_str())
    })
}

/// Number of Accessed Attributes: distinct declared attributes the body
/// refers to.
///
/// ```
/// use std::collections::BTreeSet;
/// use ktmetrics_scan::noav;
/// use ktmetrics_types::NoavMode;
///
/// let declared: BTreeSet<String> = ["count", "label"].map(String::from).into();
/// assert_eq!(noav("this.count++", &declared, NoavMode::Qualified), 1);
/// assert_eq!(noav("count + label.length", &declared, NoavMode::Qualified), 0);
/// assert_eq!(noav("count + label.length", &declared, NoavMode::Broad), 2);
/// ```
pub fn noav(body: &str, declared: &BTreeSet<String>, mode: NoavMode) -> usize {
    let referenced = referenced_attributes(body, mode);
    declared
        .iter()
        .filter(|name| referenced.contains(name.as_str()))
        .count()
}

/// Names invoked as calls anywhere in the code lines of a body.
pub fn called_names(body: &str) -> BTreeSet<&str> {
    code_lines(body)
        .flat_map(|line| {
            CALL.captures_iter(line)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str())
        })
        .collect()
}

/// Coupling between Methods: how many distinct names from `names`, other
/// than `self_name`, the body calls. Repeated calls count once.
///
/// ```
/// use std::collections::BTreeSet;
/// use ktmetrics_scan::coupling;
///
/// let names: BTreeSet<String> = ["add", "sub", "mul"].map(String::from).into();
/// assert_eq!(coupling("add(1, 2) + add(3, 4) + sub (5, 6)", &names, "mul"), 2);
/// assert_eq!(coupling("mul(1, 2)", &names, "mul"), 0);
/// ```
pub fn coupling(body: &str, names: &BTreeSet<String>, self_name: &str) -> usize {
    let called = called_names(body);
    names
        .iter()
        .filter(|name| name.as_str() != self_name && called.contains(name.as_str()))
        .count()
}
