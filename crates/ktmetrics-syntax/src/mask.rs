//! Blank out comments and literals so structure can be scanned byte-wise.
//!
//! The mask has the same length as the input, so offsets map 1:1 back to
//! the original text. Comments become spaces (newlines kept); string and
//! character literals become `_` (newlines included) so an expression that
//! is only a literal is never mistaken for whitespace.

use crate::{ParseError, line_of};

const COMMENT_FILL: u8 = b' ';
const LITERAL_FILL: u8 = b'_';

pub(crate) fn mask(text: &str) -> Result<Vec<u8>, ParseError> {
    let src = text.as_bytes();
    let mut out = src.to_vec();
    let mut i = 0;

    while i < src.len() {
        match src[i] {
            b'/' if src.get(i + 1) == Some(&b'/') => {
                let end = memchr_newline(src, i);
                fill(&mut out, i, end, COMMENT_FILL, true);
                i = end;
            }
            b'/' if src.get(i + 1) == Some(&b'*') => {
                let end = block_comment_end(src, i).ok_or(ParseError::Unterminated {
                    what: "block comment",
                    line: line_of(text, i),
                })?;
                fill(&mut out, i, end, COMMENT_FILL, true);
                i = end;
            }
            b'"' if src[i..].starts_with(b"\"\"\"") => {
                let end = raw_string_end(src, i + 3).ok_or(ParseError::Unterminated {
                    what: "raw string",
                    line: line_of(text, i),
                })?;
                fill(&mut out, i, end, LITERAL_FILL, false);
                i = end;
            }
            b'"' => {
                let end = string_end(src, i + 1).ok_or(ParseError::Unterminated {
                    what: "string",
                    line: line_of(text, i),
                })?;
                fill(&mut out, i, end, LITERAL_FILL, false);
                i = end;
            }
            b'\'' => {
                let end = char_end(src, i + 1).ok_or(ParseError::Unterminated {
                    what: "character literal",
                    line: line_of(text, i),
                })?;
                fill(&mut out, i, end, LITERAL_FILL, false);
                i = end;
            }
            _ => i += 1,
        }
    }

    Ok(out)
}

fn fill(out: &mut [u8], start: usize, end: usize, with: u8, keep_newlines: bool) {
    for b in &mut out[start..end] {
        if keep_newlines && *b == b'\n' {
            continue;
        }
        *b = with;
    }
}

fn memchr_newline(src: &[u8], from: usize) -> usize {
    src[from..]
        .iter()
        .position(|b| *b == b'\n')
        .map(|p| from + p)
        .unwrap_or(src.len())
}

/// Kotlin block comments nest.
fn block_comment_end(src: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < src.len() {
        if src[i] == b'/' && src[i + 1] == b'*' {
            depth += 1;
            i += 2;
        } else if src[i] == b'*' && src[i + 1] == b'/' {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return Some(i);
            }
        } else {
            i += 1;
        }
    }
    None
}

fn raw_string_end(src: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < src.len() {
        if src[i..].starts_with(b"\"\"\"") {
            let mut end = i + 3;
            // `""""` closes with the extra quote as content
            while src.get(end) == Some(&b'"') {
                end += 1;
            }
            return Some(end);
        }
        i += 1;
    }
    None
}

/// End (exclusive) of a single-line string starting after its opening quote.
fn string_end(src: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < src.len() {
        match src[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            b'\n' => return None,
            b'$' if src.get(i + 1) == Some(&b'{') => {
                i = template_end(src, i + 1)?;
            }
            _ => i += 1,
        }
    }
    None
}

/// Skip a `${ ... }` template; returns the offset after its closing brace.
fn template_end(src: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < src.len() {
        match src[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            b'\n' => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

fn char_end(src: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < src.len() {
        match src[i] {
            b'\\' => i += 2,
            b'\'' => return Some(i + 1),
            b'\n' => return None,
            _ => i += 1,
        }
    }
    None
}
