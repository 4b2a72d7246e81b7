//! `namespace js` extraction and include resolution.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::idl::{IdlSource, capture_includes};
use crate::text::{is_word_char, keyword_tails, strip_keyword};

/// Dot-separated identifier a source's declarations are emitted under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Wrap a namespace value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The namespace as written in the IDL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The single `namespace js` value of `source`.
///
/// `origin` names the source in the error raised when the file declares no
/// namespace or more than one distinct value.
pub fn extract_namespace(source: &IdlSource, origin: &str) -> Result<Namespace> {
    let declared: BTreeSet<&str> = source
        .bare_lines()
        .iter()
        .flat_map(|line| keyword_tails(line, "namespace"))
        .filter_map(|tail| strip_keyword(tail, "js"))
        .map(|tail| {
            let end = tail
                .find(|c: char| !(is_word_char(c) || c == '.'))
                .unwrap_or(tail.len());
            &tail[..end]
        })
        .filter(|value| !value.is_empty())
        .collect();

    let mut values = declared.iter();
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(Namespace::new(*value)),
        _ => Err(Error::Namespace {
            origin: origin.to_string(),
            found: declared.len(),
        }),
    }
}

/// Ordered include search path: a root and every directory below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeDirs(Vec<PathBuf>);

impl IncludeDirs {
    /// `root` first, then its subdirectories depth-first; siblings are
    /// visited in file-name order.
    pub fn discover(root: &Path) -> Result<Self> {
        let mut dirs = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| Error::IncludeDirs {
                root: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }
        Ok(Self(dirs))
    }

    /// Directories in search order.
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }

    /// First `<dir>/<name>.thrift` that exists.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let file_name = format!("{name}.thrift");
        self.0
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| Error::UnresolvedInclude {
                name: name.to_string(),
            })
    }
}

/// One resolved `include` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeEdge {
    /// Base name as written in the include statement.
    pub name: String,
    /// File the include resolved to.
    pub path: PathBuf,
    /// `namespace js` of the included file.
    pub namespace: Namespace,
}

/// Every include of one source, keyed by include base name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIncludes {
    edges: BTreeMap<String, IncludeEdge>,
}

impl ResolvedIncludes {
    /// Collect edges; a repeated base name keeps the last edge.
    pub fn from_edges(edges: impl IntoIterator<Item = IncludeEdge>) -> Self {
        Self {
            edges: edges
                .into_iter()
                .map(|edge| (edge.name.clone(), edge))
                .collect(),
        }
    }

    /// Edges ordered by include base name.
    pub fn edges(&self) -> impl Iterator<Item = &IncludeEdge> {
        self.edges.values()
    }

    /// Distinct namespaces of the included files.
    pub fn namespaces(&self) -> BTreeSet<&Namespace> {
        self.edges.values().map(|edge| &edge.namespace).collect()
    }
}

/// Resolve every include of `source` and read the namespace of each target.
pub fn resolve_includes(dirs: &IncludeDirs, source: &IdlSource) -> Result<ResolvedIncludes> {
    let mut edges = Vec::new();
    for name in capture_includes(source) {
        let path = dirs.resolve(&name)?;
        let included = IdlSource::read(&path)?;
        let namespace = extract_namespace(&included, &name)?;
        edges.push(IncludeEdge {
            name,
            path,
            namespace,
        });
    }
    Ok(ResolvedIncludes::from_edges(edges))
}
