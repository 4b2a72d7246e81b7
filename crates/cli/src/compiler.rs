//! The Apache Thrift compiler as a swappable collaborator.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use t2ng_core::IncludeDirs;
use tracing::debug;

/// Generator options for the server-side Java beans.
pub const DEFAULT_JAVA_GEN: &str = "java:generated_annotations=undated,beans,hashcode";
/// Generator options for the JavaScript implementation and its `.d.ts`.
pub const DEFAULT_JS_GEN: &str = "js:ts";

/// Which output a compiler run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileTarget {
    /// Java data classes, written straight into the output tree.
    Java,
    /// JavaScript and TypeScript declarations, written to a scratch directory.
    JavaScript,
}

impl fmt::Display for CompileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Java => f.write_str("Java"),
            Self::JavaScript => f.write_str("JavaScript"),
        }
    }
}

/// One compiler invocation for one IDL file.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    /// IDL file to compile.
    pub source: &'a Path,
    /// Passed as `-I <dir>` in search order.
    pub include_dirs: &'a IncludeDirs,
    /// Passed as `-out <dir>`.
    pub output_dir: &'a Path,
    /// Target the options select.
    pub target: CompileTarget,
    /// Passed as `--gen <options>`.
    pub options: &'a str,
}

/// Exit status of a finished compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured standard error.
    pub stderr: String,
}

impl CompileOutcome {
    /// A zero exit code.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Anything that can compile an IDL file for a target.
///
/// `Err` means the compiler could not be run at all; a compiler that ran and
/// failed reports it through [`CompileOutcome::code`].
pub trait ThriftCompiler {
    /// Run the compiler and wait for it to exit.
    fn compile(&self, request: &CompileRequest<'_>) -> Result<CompileOutcome, String>;
}

/// The `thrift` executable.
#[derive(Debug, Clone)]
pub struct ThriftCli {
    binary: PathBuf,
}

impl ThriftCli {
    /// Use `binary`, looked up on `PATH` when it is a bare name.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The command line for `request`:
    /// `thrift -I <dir>... -out <dir> --gen <options> <source>`.
    pub fn command(&self, request: &CompileRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.binary);
        for dir in request.include_dirs.as_slice() {
            cmd.arg("-I").arg(dir);
        }
        cmd.arg("-out")
            .arg(request.output_dir)
            .arg("--gen")
            .arg(request.options)
            .arg(request.source);
        cmd
    }
}

impl ThriftCompiler for ThriftCli {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<CompileOutcome, String> {
        let mut cmd = self.command(request);
        debug!(
            source = %request.source.display(),
            target = %request.target,
            command = ?cmd,
            "Running thrift compiler."
        );
        let output = cmd
            .output()
            .map_err(|err| format!("Failed to run {}: {err}", self.binary.display()))?;
        Ok(CompileOutcome {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
