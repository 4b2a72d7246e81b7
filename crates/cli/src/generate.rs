//! The `t2ng` run: compile every IDL file, then compose its modules.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use t2ng_core::{
    ComposedModule, DeclaredSymbols, IdlSource, IncludeDirs, ModuleContext, Namespace,
    compose_javascript, compose_typescript, extract_namespace, resolve_includes,
};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::compiler::{
    CompileOutcome, CompileRequest, CompileTarget, DEFAULT_JAVA_GEN, DEFAULT_JS_GEN, ThriftCli,
    ThriftCompiler,
};
use crate::layout::{
    DTS_SUFFIX, JS_SUFFIX, OutputTree, list_files, merge_javascript, read_files, remove_files,
    write_atomically,
};
use crate::run_command;

const SCRATCH_PREFIX: &str = "t2ng-";

/// Command-line arguments of a run.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Project name, the import-path prefix of every generated module
    #[arg(short = 'p', long = "project", value_name = "NAME", value_parser = flag_free)]
    pub project: String,
    /// Directory searched recursively for Thrift IDL files
    #[arg(short = 'i', long = "input", value_name = "DIR", value_parser = flag_free_path)]
    pub input_dir: PathBuf,
    /// Generated source directory, wiped before the run
    #[arg(short = 's', long = "output", value_name = "DIR", value_parser = flag_free_path)]
    pub output_dir: PathBuf,
    /// Merge all JavaScript modules into js/all.js
    #[arg(short = 'm', long = "merge")]
    pub merge: bool,
    /// Thrift compiler binary
    #[arg(
        long = "thrift",
        env = "T2NG_THRIFT",
        default_value = "thrift",
        value_name = "PATH",
        value_parser = flag_free_path
    )]
    pub thrift: PathBuf,
    /// Generator options for the Java beans
    #[arg(
        long = "java-gen",
        default_value = DEFAULT_JAVA_GEN,
        value_name = "OPTIONS",
        value_parser = flag_free
    )]
    pub java_gen: String,
    /// Generator options for JavaScript and TypeScript declarations
    #[arg(
        long = "js-gen",
        default_value = DEFAULT_JS_GEN,
        value_name = "OPTIONS",
        value_parser = flag_free
    )]
    pub js_gen: String,
}

fn flag_free(value: &str) -> Result<String, String> {
    if value.starts_with('-') {
        return Err(format!("missed value for parameter (got {value:?})"));
    }
    Ok(value.to_string())
}

fn flag_free_path(value: &str) -> Result<PathBuf, String> {
    flag_free(value).map(PathBuf::from)
}

/// What a finished run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Namespaces a module pair was written for, in processing order.
    pub modules: Vec<Namespace>,
    /// `js/all.js`, when merging was requested.
    pub merged: Option<PathBuf>,
    /// Declared symbols left out of the composed modules.
    pub missing_symbols: usize,
}

/// Run with the real Thrift compiler and report through the exit code.
pub fn run(args: GenerateArgs) -> i32 {
    run_command(|| {
        let start = Instant::now();
        let compiler = ThriftCli::new(&args.thrift);
        let summary = generate(&args, &compiler)?;
        info!(
            modules = summary.modules.len(),
            missing_symbols = summary.missing_symbols,
            elapsed_ms = start.elapsed().as_millis(),
            "Generated sources in {}",
            args.output_dir.display()
        );
        Ok(())
    })
}

/// Wipe the output tree, then compile and compose every IDL file below
/// `args.input_dir` with `compiler`.
pub fn generate(
    args: &GenerateArgs,
    compiler: &impl ThriftCompiler,
) -> Result<GenerateSummary, String> {
    let tree = OutputTree::init(&args.output_dir)?;
    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir()
        .map_err(|err| format!("Failed to create scratch directory: {err}"))?;
    let include_dirs = IncludeDirs::discover(&args.input_dir).map_err(|err| err.to_string())?;
    debug!(
        scratch = %scratch.path().display(),
        include_dirs = include_dirs.as_slice().len(),
        "Prepared run."
    );

    let pipeline = Pipeline {
        args,
        compiler,
        tree: &tree,
        scratch: &scratch,
        include_dirs: &include_dirs,
    };
    let mut summary = GenerateSummary::default();
    let mut written = BTreeSet::new();
    for file in list_files(&args.input_dir, "")? {
        let (namespace, missing) = pipeline.process(&file, &written)?;
        written.insert(namespace.clone());
        summary.modules.push(namespace);
        summary.missing_symbols += missing;
    }

    if args.merge {
        summary.merged = Some(merge_javascript(&tree)?);
    }
    Ok(summary)
}

struct Pipeline<'a, C> {
    args: &'a GenerateArgs,
    compiler: &'a C,
    tree: &'a OutputTree,
    scratch: &'a TempDir,
    include_dirs: &'a IncludeDirs,
}

impl<C: ThriftCompiler> Pipeline<'_, C> {
    /// Compile and compose one IDL file. Returns its namespace and the number
    /// of symbols left out of its modules.
    fn process(
        &self,
        file: &Path,
        written: &BTreeSet<Namespace>,
    ) -> Result<(Namespace, usize), String> {
        let source = IdlSource::read(file).map_err(|err| err.to_string())?;
        let namespace =
            extract_namespace(&source, &source.identifier()).map_err(|err| err.to_string())?;
        if written.contains(&namespace) {
            return Err(format!(
                "namespace {namespace} of {} was already generated by another Thrift file",
                file.display()
            ));
        }
        info!(source = %file.display(), namespace = %namespace, "Processing Thrift file.");

        let includes =
            resolve_includes(self.include_dirs, &source).map_err(|err| err.to_string())?;
        let symbols = DeclaredSymbols::from_source(&source);
        debug!(
            includes = ?includes.namespaces(),
            enums = symbols.enums.len(),
            structs = symbols.structs.len(),
            exceptions = symbols.exceptions.len(),
            services = symbols.services.len(),
            "Resolved Thrift file."
        );

        let work_dir = self.scratch.path().join(namespace.as_str());
        fs::create_dir_all(&work_dir).map_err(|err| {
            format!(
                "can't create working directory {}: {err}",
                work_dir.display()
            )
        })?;
        self.compile(file, &self.tree.java_dir(), CompileTarget::Java, &self.args.java_gen)?;
        self.compile(file, &work_dir, CompileTarget::JavaScript, &self.args.js_gen)?;

        let ctx = ModuleContext {
            project: &self.args.project,
            source: &source,
            namespace: &namespace,
            symbols: &symbols,
            includes: &includes,
        };

        let dts_files = list_files(&work_dir, DTS_SUFFIX)?;
        let declarations = compose_typescript(&ctx, &read_files(&dts_files)?);
        let js_files = list_files(&work_dir, JS_SUFFIX)?;
        let script = compose_javascript(&ctx, &read_files(&js_files)?.join("\n"));

        let missing =
            report_missing(file, "js", &script) + report_missing(file, "ts", &declarations);
        write_atomically(&self.tree.js_module(&namespace), &script.text)?;
        write_atomically(&self.tree.ts_module(&namespace), &declarations.text)?;
        remove_files(&dts_files)?;
        remove_files(&js_files)?;

        Ok((namespace, missing))
    }

    fn compile(
        &self,
        source: &Path,
        output_dir: &Path,
        target: CompileTarget,
        options: &str,
    ) -> Result<(), String> {
        let request = CompileRequest {
            source,
            include_dirs: self.include_dirs,
            output_dir,
            target,
            options,
        };
        let outcome = self.compiler.compile(&request)?;
        if outcome.success() {
            debug!(source = %source.display(), target = %target, "Compiled.");
            return Ok(());
        }
        Err(format!(
            "can't compile Thrift file {} for {target} ({}): {}",
            source.display(),
            exit_description(&outcome),
            outcome.stderr.trim()
        ))
    }
}

fn exit_description(outcome: &CompileOutcome) -> String {
    outcome.code.map_or_else(
        || "terminated by signal".to_string(),
        |code| format!("exit code {code}"),
    )
}

fn report_missing(source: &Path, module: &str, composed: &ComposedModule) -> usize {
    for symbol in &composed.missing {
        warn!(
            source = %source.display(),
            module,
            "{symbol} has no generated code, left out of the module"
        );
    }
    composed.missing.len()
}
