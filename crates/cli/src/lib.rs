//! Command-line orchestration for t2ng.
//!
//! A run wipes the output tree, then for every IDL file below the input
//! directory: extracts its namespace, resolves its includes, runs the Thrift
//! compiler for Java and for JavaScript/TypeScript, composes the CommonJS and
//! declaration modules and writes them under `js/` and `ts/`.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use clap::Parser;

pub mod compiler;
pub mod generate;
pub mod layout;
pub mod logging;

pub use compiler::{CompileOutcome, CompileRequest, CompileTarget, ThriftCli, ThriftCompiler};
pub use generate::{GenerateArgs, GenerateSummary, generate};
pub use logging::init_tracing;

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(
    name = "t2ng",
    version,
    about = "Turn Thrift JavaScript output into CommonJS and TypeScript modules"
)]
pub struct Cli {
    /// Arguments of the run.
    #[command(flatten)]
    pub args: GenerateArgs,
}

/// Parse `args` (program name first) and run, returning the process exit
/// code.
pub fn run_cli(args: Vec<String>) -> i32 {
    init_tracing();
    match Cli::try_parse_from(args) {
        Ok(cli) => generate::run(cli.args),
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Run `f`, printing its error to stderr.
pub(crate) fn run_command<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}
