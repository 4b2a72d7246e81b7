//! Error type shared by the composition engine.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading, resolving or scanning IDL sources.
#[derive(Debug, Error)]
pub enum Error {
    /// An IDL source could not be read from disk.
    #[error("Failed to read Thrift file {path}: {source}")]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A directory of the include search path could not be listed.
    #[error("Failed to list include directories under {root}: {source}")]
    IncludeDirs {
        /// Root of the include search path.
        root: PathBuf,
        /// Underlying traversal failure.
        source: walkdir::Error,
    },

    /// The source declares no `namespace js`, or several distinct ones.
    #[error(
        "incorrect or missing JavaScript namespace in Thrift file {origin} ({found} distinct declarations)"
    )]
    Namespace {
        /// Identifier of the offending source (path or include name).
        origin: String,
        /// Number of distinct `namespace js` values found.
        found: usize,
    },

    /// No include directory contains `<name>.thrift`.
    #[error("unable to resolve include file {name}.thrift")]
    UnresolvedInclude {
        /// Base name of the include target.
        name: String,
    },
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, Error>;
