//! # ktmetrics-syntax
//!
//! **Tier 1 (Parsing seam)**
//!
//! The declaration model consumed by the metric pipeline, the [`SourceParser`]
//! trait that produces it, and [`KotlinParser`], a lightweight declaration
//! extractor for Kotlin sources.
//!
//! The extractor only recovers *shallow structure*: the `package` header,
//! top-level classes, objects, interfaces and functions, and the members
//! declared directly on a class body. Function bodies are kept as raw text;
//! every metric is computed lexically from that text downstream.
//!
//! ## What belongs here
//! * Declaration data types
//! * String/comment masking and brace matching
//!
//! ## What does NOT belong here
//! * Metric computation (use ktmetrics-scan / ktmetrics-model)
//! * File discovery (use ktmetrics-walk)

mod kotlin;
mod mask;

use thiserror::Error;

pub use kotlin::KotlinParser;
pub use ktmetrics_types::UNKNOWN_PACKAGE;

/// Errors from turning source text into declarations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated {what} starting at line {line}")]
    Unterminated { what: &'static str, line: usize },

    #[error("unbalanced '{delimiter}' at line {line}")]
    Unbalanced { delimiter: char, line: usize },

    #[error("`{keyword}` declaration without a name at line {line}")]
    MissingName { keyword: &'static str, line: usize },

    #[error("malformed function declaration at line {line}")]
    MalformedFunction { line: usize },
}

/// Turns one file's text into a [`SourceUnit`].
///
/// Implementations must be pure: the same text always yields the same unit.
pub trait SourceParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<SourceUnit, ParseError>;
}

/// One file's parse result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Package identifier, [`UNKNOWN_PACKAGE`] when the file has no header.
    pub package: String,
    /// The full file text.
    pub text: String,
    /// Top-level declarations in source order.
    pub declarations: Vec<Declaration>,
}

impl SourceUnit {
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Interface(i) => Some(i),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Function(f) => Some(f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Function(FunctionDecl),
}

/// A class (or named object) declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    /// Source text of the whole declaration, header through closing brace.
    pub text: String,
    /// Members of the body block; `None` when the class has no body.
    pub members: Option<Vec<Member>>,
}

impl ClassDecl {
    /// Functions declared directly on the class body.
    pub fn methods(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.members.iter().flatten().filter_map(|m| match m {
            Member::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Properties declared directly on the class body.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.members.iter().flatten().filter_map(|m| match m {
            Member::Property(p) => Some(p),
            _ => None,
        })
    }

    /// Nested object blocks (including `companion object`).
    pub fn objects(&self) -> impl Iterator<Item = &ObjectDecl> {
        self.members.iter().flatten().filter_map(|m| match m {
            Member::Object(o) => Some(o),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    /// Raw body text: the braced block for block bodies, the expression
    /// for `= expr` bodies, `None` for abstract signatures.
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
}

/// A nested object-like block inside a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDecl {
    pub name: String,
    pub members: Vec<Member>,
}

impl ObjectDecl {
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Property(p) => Some(p),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Property(PropertyDecl),
    Function(FunctionDecl),
    Object(ObjectDecl),
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(text: &str, pos: usize) -> usize {
    let end = pos.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}
