//! Module composition from compiler output.
//!
//! The pipeline for one IDL source is:
//! 1. Resolve: own namespace, include edges and declared symbols
//! 2. Compose JavaScript: namespace-qualified script -> CommonJS module
//! 3. Compose TypeScript: ambient declarations -> exported module body
//!
//! Both composers are pure functions of a [`ModuleContext`] and the raw
//! compiler text.

pub mod javascript;
pub mod typescript;
mod utils;

use std::fmt;

use crate::idl::{DeclarationKind, DeclaredSymbols, IdlSource};
use crate::namespace::{Namespace, ResolvedIncludes};

/// Everything known about one IDL source before its output is composed.
#[derive(Debug, Clone, Copy)]
pub struct ModuleContext<'a> {
    /// Import-path prefix of every generated module.
    pub project: &'a str,
    /// The IDL source being composed.
    pub source: &'a IdlSource,
    /// `namespace js` of the source.
    pub namespace: &'a Namespace,
    /// Declarations captured from the source.
    pub symbols: &'a DeclaredSymbols,
    /// Resolved include edges of the source.
    pub includes: &'a ResolvedIncludes,
}

impl ModuleContext<'_> {
    /// `<project>/<namespace>`, the path modules are imported by.
    pub fn module_path(&self, namespace: &Namespace) -> String {
        format!("{}/{namespace}", self.project)
    }
}

/// Final text of one module plus the declarations that could not be found
/// in the compiler output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedModule {
    /// Module text, newline terminated.
    pub text: String,
    /// Declared symbols left out of `text`.
    pub missing: Vec<MissingSymbol>,
}

/// A declared symbol whose generated code was not located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSymbol {
    /// Declaration kind in the IDL.
    pub kind: DeclarationKind,
    /// Declared name.
    pub name: String,
}

impl MissingSymbol {
    pub(crate) fn new(kind: DeclarationKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for MissingSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// Join lines into module text with a trailing newline.
pub(crate) fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
