//! Brace-matching declaration extractor for Kotlin sources.
//!
//! Works on the masked text (see `mask`), so braces and keywords inside
//! strings or comments never affect structure. Only two scopes are
//! modelled: the file, and a class/object body. Everything else (function
//! bodies, initializers, `init` blocks) is skipped as an opaque block.
//!
//! ## Limitations
//!
//! - Nested classes inside a class body are recognised but dropped
//! - Companion object functions are kept on the object, not the class
//! - Expression bodies end at the first newline that does not look like a
//!   continuation (trailing operator, or a leading `.`, `?:`, `else`, ...)

use crate::mask::mask;
use crate::{
    ClassDecl, Declaration, FunctionDecl, InterfaceDecl, Member, ObjectDecl, ParseError,
    PropertyDecl, SourceParser, SourceUnit, UNKNOWN_PACKAGE, line_of,
};

/// The bundled [`SourceParser`] for `.kt` and `.kts` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct KotlinParser;

impl SourceParser for KotlinParser {
    fn parse(&self, text: &str) -> Result<SourceUnit, ParseError> {
        let masked = mask(text)?;
        check_balance(text, &masked)?;

        let cursor = Cursor { text, m: &masked };
        let items = cursor.scan_scope(0, masked.len(), Scope::File)?;

        let mut package = None;
        let mut declarations = Vec::new();
        for item in items {
            match item {
                Item::Package(name) => {
                    package.get_or_insert(name);
                }
                Item::Class(c) | Item::Object(c) => declarations.push(Declaration::Class(c)),
                Item::Interface(i) => declarations.push(Declaration::Interface(i)),
                Item::Function(f) => declarations.push(Declaration::Function(f)),
                Item::Property(_) => {}
            }
        }

        Ok(SourceUnit {
            package: package
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| UNKNOWN_PACKAGE.to_string()),
            text: text.to_string(),
            declarations,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    File,
    Body,
}

#[derive(Debug)]
enum Item {
    Package(String),
    Class(ClassDecl),
    Object(ClassDecl),
    Interface(InterfaceDecl),
    Function(FunctionDecl),
    Property(PropertyDecl),
}

/// Where a declaration header stops.
enum SigEnd {
    Block(usize),
    Expr(usize),
    Bare(usize),
}

fn check_balance(text: &str, m: &[u8]) -> Result<(), ParseError> {
    let mut stack: Vec<(u8, usize)> = Vec::new();
    for (i, b) in m.iter().enumerate() {
        match b {
            b'{' | b'(' | b'[' => stack.push((*b, i)),
            b'}' | b')' | b']' => {
                let expected = match b {
                    b'}' => b'{',
                    b')' => b'(',
                    _ => b'[',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => {
                        return Err(ParseError::Unbalanced {
                            delimiter: *b as char,
                            line: line_of(text, i),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    match stack.pop() {
        Some((open, pos)) => Err(ParseError::Unbalanced {
            delimiter: open as char,
            line: line_of(text, pos),
        }),
        None => Ok(()),
    }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn strip_backticks(name: &str) -> String {
    name.trim_matches('`').to_string()
}

/// Name of a function from the text between `fun` (minus type parameters)
/// and the parameter list: `foo`, `String.foo`, `` `a test` ``.
fn function_name(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(last) = raw.rfind('`') {
        let first = raw[..last].rfind('`')?;
        let name = &raw[first + 1..last];
        return (!name.is_empty()).then(|| name.to_string());
    }
    let name = raw.rsplit('.').next()?.trim();
    if name.is_empty() || !name.bytes().all(is_ident) {
        return None;
    }
    Some(name.to_string())
}

struct Cursor<'a> {
    text: &'a str,
    m: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn scan_scope(&self, start: usize, end: usize, scope: Scope) -> Result<Vec<Item>, ParseError> {
        let mut items = Vec::new();
        let mut i = start;
        let mut prev_word: &str = "";

        while i < end {
            let b = self.m[i];
            if matches!(b, b'{' | b'(' | b'[') {
                i = self.matching(i)? + 1;
                prev_word = "";
                continue;
            }
            if !is_ident(b) || (i > start && is_ident(self.m[i - 1])) {
                i += 1;
                continue;
            }

            let j = self.word_end(i, end);
            let word = self.word(i, j);
            let accessed = self.is_member_access(i);
            i = match word {
                "package" if scope == Scope::File => {
                    let eol = self.line_end(j);
                    let name = self.text[j..eol].trim().trim_end_matches(';').trim();
                    items.push(Item::Package(name.to_string()));
                    eol
                }
                "import" | "typealias" if scope == Scope::File => self.line_end(j),
                "fun" if !accessed => {
                    let (decl, next) = self.function(i, j, end)?;
                    items.extend(decl.map(Item::Function));
                    next
                }
                "class" | "interface" | "object" if !accessed => {
                    let (item, next) = self.type_decl(word, i, j, end, prev_word)?;
                    items.extend(item);
                    next
                }
                "val" | "var" if !accessed => {
                    let (prop, next) = self.property(j, end)?;
                    items.extend(prop.map(Item::Property));
                    next
                }
                _ => j,
            };
            prev_word = word;
        }

        Ok(items)
    }

    fn function(
        &self,
        kw: usize,
        after: usize,
        end: usize,
    ) -> Result<(Option<FunctionDecl>, usize), ParseError> {
        let malformed = || ParseError::MalformedFunction {
            line: line_of(self.text, kw),
        };

        let mut p = self.skip_ws(after, end);
        if p >= end {
            return Err(malformed());
        }
        // anonymous function, or `fun interface`
        if self.m[p] == b'(' || self.word(p, self.word_end(p, end)) == "interface" {
            return Ok((None, p));
        }
        if self.m[p] == b'<' {
            p = self.angle_end(p, end).ok_or_else(malformed)?;
        }

        let open = (p..end)
            .find(|&q| matches!(self.m[q], b'(' | b'{' | b'}' | b'=' | b';'))
            .filter(|&q| self.m[q] == b'(')
            .ok_or_else(malformed)?;
        let name = function_name(&self.text[p..open]).ok_or_else(malformed)?;
        let close = self.matching(open)?;

        let (body, next) = match self.signature_end(close + 1, end)? {
            SigEnd::Block(o) => {
                let c = self.matching(o)?;
                (Some(self.text[o..=c].to_string()), c + 1)
            }
            SigEnd::Expr(eq) => {
                let e = self.expression_end(eq + 1, end)?;
                (Some(self.text[eq + 1..e].trim().to_string()), e)
            }
            SigEnd::Bare(q) => (None, q),
        };

        Ok((Some(FunctionDecl { name, body }), next))
    }

    fn type_decl(
        &self,
        keyword: &str,
        kw: usize,
        after: usize,
        end: usize,
        prev_word: &str,
    ) -> Result<(Option<Item>, usize), ParseError> {
        let p = self.skip_ws(after, end);
        let name_end = self.name_end(p, end);
        let name = if name_end > p {
            strip_backticks(&self.text[p..name_end])
        } else if keyword == "object" && prev_word == "companion" {
            "Companion".to_string()
        } else if keyword == "object" {
            // object expression; its block is skipped by the caller
            return Ok((None, after));
        } else {
            return Err(ParseError::MissingName {
                keyword: if keyword == "class" {
                    "class"
                } else {
                    "interface"
                },
                line: line_of(self.text, kw),
            });
        };

        let decl_start = self.decl_start(kw);
        let (members, text, next) = match self.signature_end(name_end.max(p), end)? {
            SigEnd::Block(o) => {
                let c = self.matching(o)?;
                let members = if keyword == "interface" {
                    None
                } else {
                    Some(self.members(o + 1, c)?)
                };
                (members, &self.text[decl_start..=c], c + 1)
            }
            SigEnd::Expr(q) | SigEnd::Bare(q) => (None, self.text[decl_start..q].trim_end(), q),
        };

        let item = match keyword {
            "interface" => Item::Interface(InterfaceDecl {
                name,
                text: text.to_string(),
            }),
            "object" => Item::Object(ClassDecl {
                name,
                text: text.to_string(),
                members,
            }),
            _ => Item::Class(ClassDecl {
                name,
                text: text.to_string(),
                members,
            }),
        };
        Ok((Some(item), next))
    }

    fn members(&self, start: usize, end: usize) -> Result<Vec<Member>, ParseError> {
        let members = self
            .scan_scope(start, end, Scope::Body)?
            .into_iter()
            .filter_map(|item| match item {
                Item::Property(p) => Some(Member::Property(p)),
                Item::Function(f) => Some(Member::Function(f)),
                Item::Object(o) => Some(Member::Object(ObjectDecl {
                    name: o.name,
                    members: o.members.unwrap_or_default(),
                })),
                Item::Class(_) | Item::Interface(_) | Item::Package(_) => None,
            })
            .collect();
        Ok(members)
    }

    fn property(&self, after: usize, end: usize) -> Result<(Option<PropertyDecl>, usize), ParseError> {
        let mut q = self.skip_ws(after, end);
        if q < end && self.m[q] == b'<' {
            q = match self.angle_end(q, end) {
                Some(e) => self.skip_ws(e, end),
                None => return Ok((None, q)),
            };
        }

        // `val Receiver<T>.name` keeps only the last segment
        let mut last = None;
        loop {
            let e = self.name_end(q, end);
            if e == q {
                break;
            }
            last = Some((q, e));
            q = e;
            if q < end && self.m[q] == b'<' {
                match self.angle_end(q, end) {
                    Some(a) => q = a,
                    None => break,
                }
            }
            if q < end && self.m[q] == b'.' {
                q += 1;
                continue;
            }
            break;
        }

        let prop = last.map(|(s, e)| PropertyDecl {
            name: strip_backticks(&self.text[s..e]),
        });
        Ok((prop, q))
    }

    fn signature_end(&self, from: usize, end: usize) -> Result<SigEnd, ParseError> {
        let mut q = from;
        let mut angle = 0usize;
        while q < end {
            match self.m[q] {
                b'(' | b'[' => {
                    q = self.matching(q)? + 1;
                    continue;
                }
                b'<' => angle += 1,
                b'>' if q > 0 && self.m[q - 1] != b'-' => angle = angle.saturating_sub(1),
                b'{' => return Ok(SigEnd::Block(q)),
                b'=' if angle == 0 && self.is_assignment(q) => return Ok(SigEnd::Expr(q)),
                b';' | b'}' => return Ok(SigEnd::Bare(q)),
                b'\n' if angle == 0 && !self.continues_signature(q) => return Ok(SigEnd::Bare(q)),
                _ => {}
            }
            q += 1;
        }
        Ok(SigEnd::Bare(end))
    }

    fn expression_end(&self, from: usize, end: usize) -> Result<usize, ParseError> {
        let mut q = from;
        let mut seen = false;
        while q < end {
            match self.m[q] {
                b'(' | b'[' | b'{' => {
                    q = self.matching(q)? + 1;
                    seen = true;
                    continue;
                }
                b';' | b'}' => return Ok(q),
                b'\n' if seen && !self.continues_expression(q) => return Ok(q),
                b' ' | b'\t' | b'\r' | b'\n' => {}
                _ => seen = true,
            }
            q += 1;
        }
        Ok(end)
    }

    fn continues_signature(&self, nl: usize) -> bool {
        let tail = self.line_before(nl).trim_end();
        if tail.ends_with([',', ':', '.', '<']) || tail.ends_with("->") {
            return true;
        }
        let head = self.next_line_head(nl);
        head.starts_with(['{', '=', ':', ',', '.', '>'])
            || head.starts_with("->")
            || starts_with_word(head, "where")
    }

    fn continues_expression(&self, nl: usize) -> bool {
        let tail = self.line_before(nl).trim_end();
        if tail.is_empty()
            || tail.ends_with([
                '=', '(', '[', ',', '.', '+', '-', '*', '/', '%', '&', '|', '?', ':', '<', '>',
            ])
        {
            return true;
        }
        let head = self.next_line_head(nl);
        head.starts_with(['.', '?', '+', '-', '*', '/', '%', '&', '|', ':', '='])
            || ["else", "catch", "finally", "as"]
                .iter()
                .any(|w| starts_with_word(head, w))
    }

    fn is_assignment(&self, q: usize) -> bool {
        let next = self.m.get(q + 1).copied();
        let prev = if q > 0 { self.m[q - 1] } else { b' ' };
        next != Some(b'=') && next != Some(b'>') && !matches!(prev, b'=' | b'!' | b'<' | b'>')
    }

    /// `x.fun`, `Foo::class` and friends are expressions, not declarations.
    fn is_member_access(&self, i: usize) -> bool {
        let mut p = i;
        while p > 0 && self.m[p - 1].is_ascii_whitespace() {
            p -= 1;
        }
        if p == 0 {
            return false;
        }
        self.m[p - 1] == b'.' || (p >= 2 && self.m[p - 1] == b':' && self.m[p - 2] == b':')
    }

    fn matching(&self, open: usize) -> Result<usize, ParseError> {
        let o = self.m[open];
        let c = match o {
            b'{' => b'}',
            b'(' => b')',
            _ => b']',
        };
        let mut depth = 0usize;
        for (q, b) in self.m.iter().enumerate().skip(open) {
            if *b == o {
                depth += 1;
            } else if *b == c {
                depth -= 1;
                if depth == 0 {
                    return Ok(q);
                }
            }
        }
        Err(ParseError::Unbalanced {
            delimiter: o as char,
            line: line_of(self.text, open),
        })
    }

    /// Offset after the `>` closing a type parameter list opened at `open`.
    fn angle_end(&self, open: usize, end: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut q = open;
        while q < end {
            match self.m[q] {
                b'<' => depth += 1,
                b'>' if self.m[q - 1] != b'-' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(q + 1);
                    }
                }
                b'{' | b'}' | b';' | b'=' => return None,
                _ => {}
            }
            q += 1;
        }
        None
    }

    fn name_end(&self, p: usize, end: usize) -> usize {
        if p >= end {
            return p;
        }
        if self.m[p] == b'`' {
            return match self.m[p + 1..end].iter().position(|b| *b == b'`' || *b == b'\n') {
                Some(off) if self.m[p + 1 + off] == b'`' && off > 0 => p + off + 2,
                _ => p,
            };
        }
        let e = self.word_end(p, end);
        // digits start literals; all-underscore runs are masked strings
        if self.m[p].is_ascii_digit() || self.m[p..e].iter().all(|b| *b == b'_') {
            return p;
        }
        e
    }

    fn word_end(&self, start: usize, end: usize) -> usize {
        let mut j = start;
        while j < end && is_ident(self.m[j]) {
            j += 1;
        }
        j
    }

    fn word(&self, start: usize, end: usize) -> &'a str {
        std::str::from_utf8(&self.m[start..end]).unwrap_or("")
    }

    fn skip_ws(&self, from: usize, end: usize) -> usize {
        let mut q = from;
        while q < end && self.m[q].is_ascii_whitespace() {
            q += 1;
        }
        q
    }

    fn line_end(&self, from: usize) -> usize {
        self.m[from..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|p| from + p)
            .unwrap_or(self.m.len())
    }

    fn line_start(&self, pos: usize) -> usize {
        self.m[..pos]
            .iter()
            .rposition(|b| *b == b'\n')
            .map(|p| p + 1)
            .unwrap_or(0)
    }

    /// First non-blank offset on the keyword's line (modifiers included).
    fn decl_start(&self, kw: usize) -> usize {
        let ls = self.line_start(kw);
        let mut q = ls;
        while q < kw && self.m[q].is_ascii_whitespace() {
            q += 1;
        }
        q
    }

    fn line_before(&self, nl: usize) -> &'a str {
        self.word(self.line_start(nl), nl)
    }

    /// Masked content of the next non-blank line, leading whitespace trimmed.
    fn next_line_head(&self, nl: usize) -> &'a str {
        let mut q = nl + 1;
        while q < self.m.len() {
            let e = self.line_end(q);
            let line = self.word(q, e).trim_start();
            if !line.is_empty() {
                return line;
            }
            q = e + 1;
        }
        ""
    }
}

fn starts_with_word(s: &str, word: &str) -> bool {
    s.strip_prefix(word)
        .is_some_and(|rest| !rest.bytes().next().is_some_and(is_ident))
}
