//! End-to-end runs of the generation pipeline against a fake Thrift compiler
//! that writes canned compiler output.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use t2ng_cli::compiler::{DEFAULT_JAVA_GEN, DEFAULT_JS_GEN};
use t2ng_cli::{
    CompileOutcome, CompileRequest, CompileTarget, GenerateArgs, ThriftCompiler, generate,
};
use tempfile::TempDir;

const DEMO_IDL: &str = r#"namespace js demo

enum Color {
  RED,
  GREEN
}

struct Point {
  1: i32 x
  2: i32 y
}
"#;

const DEMO_JS: &str = r#"//
// Autogenerated by Thrift Compiler (0.9.3)
//
// DO NOT EDIT UNLESS YOU ARE SURE THAT YOU KNOW WHAT YOU ARE DOING
//

if (typeof demo === 'undefined') {
  demo = {};
}
demo.Color = {
  'RED' : 0,
  'GREEN' : 1
};
demo.Point = function(args) {
  this.x = null;
  this.y = null;
  if (args) {
    if (args.x !== undefined) {
      this.x = args.x;
    }
    if (args.y !== undefined) {
      this.y = args.y;
    }
  }
};
demo.Point.prototype = {};
demo.Point.prototype.read = function(input) {
  input.readStructBegin();
  input.readStructEnd();
  return;
};

demo.Point.prototype.write = function(output) {
  output.writeStructBegin('Point');
  output.writeStructEnd();
  return;
};
"#;

const DEMO_DTS: &str = r#"//
// Autogenerated by Thrift Compiler (0.9.3)
//
// DO NOT EDIT UNLESS YOU ARE SURE THAT YOU KNOW WHAT YOU ARE DOING
//


declare module demo {
  enum Color {
    RED = 0,
    GREEN = 1,
  }

  class Point {
    x: number;
    y: number;

      constructor(args?: { x: number; y: number; });
  }
}
"#;

const EXTRA_IDL: &str = "namespace js extra\nenum Mode { ON, OFF }\n";
const EXTRA_JS: &str = "extra.Mode = {\n  'ON' : 0,\n  'OFF' : 1\n};\n";
const EXTRA_DTS: &str =
    "declare module extra {\n  enum Mode {\n    ON = 0,\n    OFF = 1,\n  }\n}\n";

const COMMON_IDL: &str = "namespace js pkg.common\n\nstruct User {\n  1: string name\n}\n";
const COMMON_JS: &str = r#"pkg.common.User = function(args) {
  this.name = null;
};
pkg.common.User.prototype = {};
pkg.common.User.prototype.read = function(input) {
  return;
};
"#;
const COMMON_DTS: &str =
    "declare module pkg.common {\n  class User {\n    name: string;\n  }\n}\n";

const MODEL_IDL: &str = r#"include "common.thrift"

namespace js pkg.model

struct Holder {
  1: common.User owner
}
"#;
const MODEL_JS: &str = r#"pkg.model.Holder = function(args) {
  this.owner = null;
  if (args) {
    if (args.owner !== undefined) {
      this.owner = new pkg.common.User(args.owner);
    }
  }
};
pkg.model.Holder.prototype = {};
pkg.model.Holder.prototype.read = function(input) {
  this.owner = new pkg.common.User();
  this.owner.read(input);
  return;
};
"#;
const MODEL_DTS: &str = r#"declare module pkg.model {
  class Holder {
    owner: pkg.common.User;

      constructor(args?: { owner: pkg.common.User; });
  }
}
"#;

#[derive(Debug, Clone)]
struct Recorded {
    source: PathBuf,
    target: CompileTarget,
    include_dirs: Vec<PathBuf>,
    options: String,
}

/// Writes `<stem>_types.js` and `<stem>_types.d.ts` for known sources and a
/// placeholder bean for Java.
#[derive(Debug, Default)]
struct FakeCompiler {
    outputs: BTreeMap<&'static str, (&'static str, &'static str)>,
    fail_on: Option<CompileTarget>,
    requests: RefCell<Vec<Recorded>>,
}

impl FakeCompiler {
    fn with(outputs: &[(&'static str, &'static str, &'static str)]) -> Self {
        Self {
            outputs: outputs
                .iter()
                .map(|&(stem, js, dts)| (stem, (js, dts)))
                .collect(),
            ..Self::default()
        }
    }
}

impl ThriftCompiler for FakeCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<CompileOutcome, String> {
        self.requests.borrow_mut().push(Recorded {
            source: request.source.to_path_buf(),
            target: request.target,
            include_dirs: request.include_dirs.as_slice().to_vec(),
            options: request.options.to_string(),
        });
        if self.fail_on == Some(request.target) {
            return Ok(CompileOutcome {
                code: Some(1),
                stderr: "[FAILURE:model.thrift:3] bad input\n".to_string(),
            });
        }

        let stem = request.source.file_stem().unwrap().to_str().unwrap();
        match request.target {
            CompileTarget::Java => {
                let dir = request.output_dir.join(stem);
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join("Generated.java"), "// bean\n").unwrap();
            }
            CompileTarget::JavaScript => {
                let (js, dts) = self.outputs.get(stem).copied().unwrap_or(("", ""));
                fs::write(request.output_dir.join(format!("{stem}_types.js")), js).unwrap();
                fs::write(request.output_dir.join(format!("{stem}_types.d.ts")), dts).unwrap();
            }
        }
        Ok(CompileOutcome {
            code: Some(0),
            stderr: String::new(),
        })
    }
}

fn write_idl(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn args(project: &str, input: &Path, output: &Path, merge: bool) -> GenerateArgs {
    GenerateArgs {
        project: project.to_string(),
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        merge,
        thrift: PathBuf::from("thrift"),
        java_gen: DEFAULT_JAVA_GEN.to_string(),
        js_gen: DEFAULT_JS_GEN.to_string(),
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_demo_module_pair() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    let output = temp.path().join("generated");
    write_idl(&input, "demo.thrift", DEMO_IDL);
    fs::create_dir_all(output.join("js")).unwrap();
    fs::write(output.join("js/stale.js"), "stale").unwrap();

    let compiler = FakeCompiler::with(&[("demo", DEMO_JS, DEMO_DTS)]);
    let summary = generate(&args("app", &input, &output, false), &compiler).unwrap();
    assert_eq!(summary.modules.len(), 1);
    assert_eq!(summary.modules[0].as_str(), "demo");
    assert_eq!(summary.missing_symbols, 0);
    assert_eq!(summary.merged, None);

    assert_eq!(file_names(&output.join("js")), ["demo.js"]);
    assert_eq!(file_names(&output.join("ts")), ["demo.d.ts"]);
    assert!(output.join("java/demo/Generated.java").is_file());

    let js = fs::read_to_string(output.join("js/demo.js")).unwrap();
    assert!(js.starts_with("var demo = require ('app/demo');\n"));
    assert!(js.contains("exports.Color = { 'RED' : 0,\n  'GREEN' : 1 }"));
    assert!(js.contains("exports.Point = (function () { function Point(args) {"));
    assert!(js.contains("Point.prototype.read = function(input) {"));
    assert!(js.contains("Point.prototype.write = function(output) {"));
    assert!(!js.contains("demo.Point"));

    let ts = fs::read_to_string(output.join("ts/demo.d.ts")).unwrap();
    assert!(ts.starts_with("declare module 'app/demo' {\nimport Thrift from 'thrift/Thrift';\n"));
    assert!(ts.contains("export enum Color {"));
    assert!(ts.contains("export class Point {"));
    assert!(ts.contains("constructor(args?: { x: number; y: number; });"));
    assert!(!ts.contains("import {"));
    assert!(ts.ends_with("}\n}\n"));

    let requests = compiler.requests.borrow();
    let targets: Vec<CompileTarget> = requests.iter().map(|r| r.target).collect();
    assert_eq!(targets, [CompileTarget::Java, CompileTarget::JavaScript]);
    assert_eq!(requests[0].options, DEFAULT_JAVA_GEN);
    assert_eq!(requests[1].options, DEFAULT_JS_GEN);
    assert!(requests.iter().all(|r| r.source == input.join("demo.thrift")));
}

#[test]
fn test_project_with_path_separators() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    let output = temp.path().join("generated");
    write_idl(&input, "demo.thrift", DEMO_IDL);

    let compiler = FakeCompiler::with(&[("demo", DEMO_JS, DEMO_DTS)]);
    let summary = generate(&args("src/app", &input, &output, false), &compiler).unwrap();
    assert_eq!(summary.modules.len(), 1);

    let js = fs::read_to_string(output.join("js/demo.js")).unwrap();
    assert!(js.starts_with("var demo = require ('src/app/demo');\n"));
    let ts = fs::read_to_string(output.join("ts/demo.d.ts")).unwrap();
    assert!(ts.starts_with("declare module 'src/app/demo' {\n"));

    let scoped = generate(
        &args("@scope/contracts", &input, &output, false),
        &FakeCompiler::with(&[("demo", DEMO_JS, DEMO_DTS)]),
    )
    .unwrap();
    assert_eq!(scoped.modules.len(), 1);
    let js = fs::read_to_string(output.join("js/demo.js")).unwrap();
    assert!(js.starts_with("var demo = require ('@scope/contracts/demo');\n"));
}

#[test]
fn test_merge_keeps_listing_order() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    let output = temp.path().join("generated");
    write_idl(&input, "demo.thrift", DEMO_IDL);
    write_idl(&input, "extra.thrift", EXTRA_IDL);

    let compiler = FakeCompiler::with(&[
        ("demo", DEMO_JS, DEMO_DTS),
        ("extra", EXTRA_JS, EXTRA_DTS),
    ]);
    let summary = generate(&args("app", &input, &output, true), &compiler).unwrap();
    assert_eq!(summary.merged, Some(output.join("js/all.js")));

    assert_eq!(file_names(&output.join("js")), ["all.js"]);
    assert_eq!(file_names(&output.join("ts")), ["demo.d.ts", "extra.d.ts"]);

    let merged = fs::read_to_string(output.join("js/all.js")).unwrap();
    let color = merged.find("exports.Color").unwrap();
    let point = merged.find("exports.Point").unwrap();
    let mode = merged.find("exports.Mode").unwrap();
    assert!(color < point && point < mode);
    assert_eq!(merged.matches("var demo = require ('app/demo');").count(), 1);
    assert_eq!(merged.matches("var extra = require ('app/extra');").count(), 1);
}

#[test]
fn test_included_namespace_is_imported() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    let output = temp.path().join("generated");
    write_idl(&input, "common/common.thrift", COMMON_IDL);
    write_idl(&input, "model.thrift", MODEL_IDL);

    let compiler = FakeCompiler::with(&[
        ("common", COMMON_JS, COMMON_DTS),
        ("model", MODEL_JS, MODEL_DTS),
    ]);
    let summary = generate(&args("app", &input, &output, false), &compiler).unwrap();
    let namespaces: Vec<&str> = summary.modules.iter().map(|ns| ns.as_str()).collect();
    assert_eq!(namespaces, ["pkg.common", "pkg.model"]);

    let js = fs::read_to_string(output.join("js/pkg.model.js")).unwrap();
    let imports: Vec<&str> = js.lines().take_while(|l| l.starts_with("var ")).collect();
    assert_eq!(
        imports,
        [
            "var pkg.common = require ('app/pkg.common');",
            "var pkg.model = require ('app/pkg.model');",
        ]
    );
    assert!(js.contains("exports.Holder = (function () { function Holder(args) {"));
    assert!(js.contains("this.owner = new pkg.common.User(args.owner);"));

    let ts = fs::read_to_string(output.join("ts/pkg.model.d.ts")).unwrap();
    assert!(ts.contains("import { User } from 'app/pkg.common';"));
    assert!(ts.contains("export class Holder {"));
    assert!(ts.contains("owner: User;"));
    assert!(!ts.contains("pkg.common.User"));

    let common_ts = fs::read_to_string(output.join("ts/pkg.common.d.ts")).unwrap();
    assert!(common_ts.starts_with("declare module 'app/pkg.common' {"));
    assert!(common_ts.contains("export class User {"));

    let requests = compiler.requests.borrow();
    assert!(
        requests
            .iter()
            .all(|r| r.include_dirs == [input.clone(), input.join("common")])
    );
}

#[test]
fn test_missing_generated_code_is_counted() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    let output = temp.path().join("generated");
    write_idl(
        &input,
        "demo.thrift",
        &format!("{DEMO_IDL}\nexception Oops {{\n  1: string message\n}}\n"),
    );

    let compiler = FakeCompiler::with(&[("demo", DEMO_JS, DEMO_DTS)]);
    let summary = generate(&args("app", &input, &output, false), &compiler).unwrap();
    assert_eq!(summary.missing_symbols, 2);

    let js = fs::read_to_string(output.join("js/demo.js")).unwrap();
    assert!(js.contains("exports.Point"));
    assert!(!js.contains("Oops"));
}

#[test]
fn test_compiler_failure_aborts() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    let output = temp.path().join("generated");
    write_idl(&input, "demo.thrift", DEMO_IDL);

    let compiler = FakeCompiler {
        fail_on: Some(CompileTarget::JavaScript),
        ..FakeCompiler::with(&[("demo", DEMO_JS, DEMO_DTS)])
    };
    let err = generate(&args("app", &input, &output, false), &compiler).unwrap_err();
    assert!(err.contains("can't compile Thrift file"));
    assert!(err.contains("for JavaScript (exit code 1)"));
    assert!(err.contains("bad input"));
    assert!(file_names(&output.join("js")).is_empty());
}

#[test]
fn test_missing_namespace_aborts() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    let output = temp.path().join("generated");
    write_idl(&input, "plain.thrift", "struct Lonely {}\n");

    let compiler = FakeCompiler::default();
    let err = generate(&args("app", &input, &output, false), &compiler).unwrap_err();
    assert!(err.contains("incorrect or missing JavaScript namespace"));
    assert!(compiler.requests.borrow().is_empty());
}

#[test]
fn test_duplicate_namespace_aborts() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    let output = temp.path().join("generated");
    write_idl(&input, "a.thrift", "namespace js same\nstruct A {}\n");
    write_idl(&input, "b.thrift", "namespace js same\nstruct B {}\n");

    let err = generate(&args("app", &input, &output, false), &FakeCompiler::default())
        .unwrap_err();
    assert!(err.contains("namespace same"));
    assert!(err.contains("already generated"));
}

#[test]
fn test_unresolved_include_aborts() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    let output = temp.path().join("generated");
    write_idl(&input, "model.thrift", MODEL_IDL);

    let err = generate(&args("app", &input, &output, false), &FakeCompiler::default())
        .unwrap_err();
    assert!(err.contains("common"));
}

#[test]
fn test_run_cli_exit_codes() {
    let argv = |args: &[&str]| -> Vec<String> {
        std::iter::once("t2ng")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    };
    assert_eq!(t2ng_cli::run_cli(argv(&["-i", "idl", "-s", "out"])), 2);
    assert_eq!(t2ng_cli::run_cli(argv(&["-p=-s", "-i", "idl", "-s", "out"])), 2);

    let temp = TempDir::new().unwrap();
    let input = temp.path().join("idl");
    write_idl(&input, "demo.thrift", DEMO_IDL);
    let code = t2ng_cli::run_cli(argv(&[
        "-p",
        "app",
        "-i",
        input.to_str().unwrap(),
        "-s",
        temp.path().join("out").to_str().unwrap(),
        "--thrift",
        temp.path().join("no-such-thrift").to_str().unwrap(),
    ]));
    assert_eq!(code, 1);
}
