//! Thrift IDL sources and declaration capture.
//!
//! IDL files are never parsed. Every capture is a line scan for a keyword
//! followed by an identifier, run over a comment-free view of each line so
//! that prose in doc comments cannot produce phantom declarations.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

use crate::error::{Error, Result};
use crate::text::{keyword_tails, take_word};

/// One Thrift file, read once and never mutated.
#[derive(Debug, Clone)]
pub struct IdlSource {
    path: PathBuf,
    code: Vec<String>,
    bare: Vec<String>,
}

impl IdlSource {
    /// Read a Thrift file from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(path, &contents))
    }

    /// Build a source from text already in memory.
    pub fn from_text(path: impl Into<PathBuf>, contents: &str) -> Self {
        let (code, bare) = strip_comments(contents.lines()).into_iter().unzip();
        Self {
            path: path.into(),
            code,
            bare,
        }
    }

    /// Human readable identifier used in error messages.
    pub fn identifier(&self) -> String {
        self.path.display().to_string()
    }

    /// Lines with `//`, `#` and `/* */` comments removed, one per source
    /// line. String literals are kept as written.
    pub fn code_lines(&self) -> &[String] {
        &self.code
    }

    /// [`IdlSource::code_lines`] with the contents of every string literal
    /// replaced by spaces, so text inside literals never reads as a
    /// declaration or a qualified reference.
    pub fn bare_lines(&self) -> &[String] {
        &self.bare
    }
}

/// Declaration keywords recognised in IDL sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclarationKind {
    /// `enum Name`
    Enum,
    /// `struct Name`
    Struct,
    /// `exception Name`
    Exception,
    /// `service Name`
    Service,
}

impl DeclarationKind {
    /// The IDL keyword introducing this kind of declaration.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Exception => "exception",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Names declared by one IDL source, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredSymbols {
    /// Declared enums.
    pub enums: BTreeSet<String>,
    /// Declared structs.
    pub structs: BTreeSet<String>,
    /// Declared exceptions.
    pub exceptions: BTreeSet<String>,
    /// Declared services.
    pub services: BTreeSet<String>,
}

impl DeclaredSymbols {
    /// Capture every declaration kind from `source`.
    pub fn from_source(source: &IdlSource) -> Self {
        Self {
            enums: capture(source, DeclarationKind::Enum),
            structs: capture(source, DeclarationKind::Struct),
            exceptions: capture(source, DeclarationKind::Exception),
            services: capture(source, DeclarationKind::Service),
        }
    }

    /// A name captured as an exception is an exception, even when it was
    /// also captured as a struct.
    pub fn is_exception(&self, name: &str) -> bool {
        self.exceptions.contains(name)
    }

    /// Structs and exceptions: every name that composes to a constructor.
    pub fn types(&self) -> BTreeSet<&str> {
        self.structs
            .iter()
            .chain(&self.exceptions)
            .map(String::as_str)
            .collect()
    }

    /// `<Service>Client` for every declared service.
    pub fn service_clients(&self) -> BTreeSet<String> {
        self.services
            .iter()
            .map(|service| format!("{service}Client"))
            .collect()
    }

    /// Whether `name` is declared as a TypeScript class by this source.
    pub fn is_class(&self, name: &str) -> bool {
        self.structs.contains(name)
            || self.exceptions.contains(name)
            || self.services.contains(name)
            || self.service_clients().contains(name)
    }
}

/// Every distinct identifier declared with `kind`'s keyword.
pub fn capture(source: &IdlSource, kind: DeclarationKind) -> BTreeSet<String> {
    source
        .bare_lines()
        .iter()
        .flat_map(|line| keyword_tails(line, kind.keyword()))
        .map(take_word)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Base names of every `include "<name>.thrift"` statement.
pub fn capture_includes(source: &IdlSource) -> BTreeSet<String> {
    source
        .code_lines()
        .iter()
        .flat_map(|line| keyword_tails(line, "include"))
        .filter_map(include_target)
        .map(str::to_string)
        .collect()
}

fn include_target(tail: &str) -> Option<&str> {
    let quoted = tail.strip_prefix('"')?;
    let name = take_word(quoted);
    if name.is_empty() {
        return None;
    }
    quoted[name.len()..]
        .starts_with(".thrift\"")
        .then_some(name)
}

/// Remove comments line by line, yielding `(code, bare)` for each line.
/// Block comments may span lines. String literals are copied verbatim into
/// `code` so comment markers inside them survive, and blanked in `bare`.
fn strip_comments<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<(String, String)> {
    let mut in_block = false;
    lines
        .map(|line| {
            let mut code = String::with_capacity(line.len());
            let mut bare = String::with_capacity(line.len());
            let mut chars = line.chars().peekable();
            while let Some(ch) = chars.next() {
                if in_block {
                    if ch == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        in_block = false;
                        code.push(' ');
                        bare.push(' ');
                    }
                    continue;
                }
                match ch {
                    '"' | '\'' => copy_literal(ch, &mut chars, &mut code, &mut bare),
                    '#' => break,
                    '/' if chars.peek() == Some(&'/') => break,
                    '/' if chars.peek() == Some(&'*') => {
                        chars.next();
                        in_block = true;
                    }
                    _ => {
                        code.push(ch);
                        bare.push(ch);
                    }
                }
            }
            (code, bare)
        })
        .collect()
}

fn copy_literal(
    quote: char,
    chars: &mut Peekable<Chars<'_>>,
    code: &mut String,
    bare: &mut String,
) {
    code.push(quote);
    bare.push(quote);
    while let Some(ch) = chars.next() {
        code.push(ch);
        if ch == quote {
            bare.push(quote);
            return;
        }
        bare.push(' ');
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                code.push(escaped);
                bare.push(' ');
            }
        }
    }
}
