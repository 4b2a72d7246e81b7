//! TypeScript declaration module composition.

use std::collections::BTreeSet;

use super::utils::{Quoted, qualified_references, strip_block_comments, strip_qualifier};
use super::{ComposedModule, MissingSymbol, ModuleContext, join_lines};
use crate::idl::{DeclarationKind, DeclaredSymbols};
use crate::text::{strip_keyword, take_word};

/// Runtime support import every generated declaration file relies on.
pub const THRIFT_RUNTIME_IMPORT: &str = "import Thrift from 'thrift/Thrift';";

/// Rewrite the compiler's ambient `.d.ts` files for `ctx.source` into one
/// `declare module '<project>/<namespace>'` block with explicit imports.
///
/// Each entry of `declaration_files` is the full text of one generated file.
pub fn compose_typescript(
    ctx: &ModuleContext<'_>,
    declaration_files: &[String],
) -> ComposedModule {
    let mut lines = vec![
        format!("declare module '{}' {{", ctx.module_path(ctx.namespace)),
        THRIFT_RUNTIME_IMPORT.to_string(),
    ];
    lines.extend(cross_module_imports(ctx));

    let mut exported = BTreeSet::new();
    for file in declaration_files {
        lines.extend(adapt_declarations(ctx, file, &mut exported));
    }
    lines.push("}".to_string());

    let mut missing = Vec::new();
    for (kind, names) in [
        (DeclarationKind::Enum, &ctx.symbols.enums),
        (DeclarationKind::Struct, &ctx.symbols.structs),
        (DeclarationKind::Exception, &ctx.symbols.exceptions),
    ] {
        for name in names {
            if !exported.contains(name.as_str()) {
                missing.push(MissingSymbol::new(kind, name));
            }
        }
    }

    ComposedModule {
        text: join_lines(&lines),
        missing,
    }
}

/// `import { Symbol } from '<project>/<ns>';` for every `<include>.<Symbol>`
/// reference in the IDL source.
fn cross_module_imports(ctx: &ModuleContext<'_>) -> Vec<String> {
    let mut imports = Vec::new();
    for edge in ctx.includes.edges() {
        let symbols: BTreeSet<&str> = ctx
            .source
            .bare_lines()
            .iter()
            .flat_map(|line| qualified_references(line, &edge.name))
            .collect();
        let path = ctx.module_path(&edge.namespace);
        imports.extend(
            symbols
                .into_iter()
                .map(|symbol| format!("import {{ {symbol} }} from '{path}';")),
        );
    }
    imports
}

/// Body lines of one declaration file, with its closing `}` dropped.
fn adapt_declarations<'a>(
    ctx: &ModuleContext<'_>,
    file: &'a str,
    exported: &mut BTreeSet<&'a str>,
) -> Vec<String> {
    let included = ctx.includes.namespaces();
    let mut adapted = Vec::new();

    for raw in file.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || raw.contains("declare module") || trimmed.starts_with("//") {
            continue;
        }

        let mut line = match export_header(raw, ctx.symbols) {
            Some((name, header)) => {
                exported.insert(name);
                header
            }
            None => raw.to_string(),
        };
        line = strip_qualifier(&line, ctx.namespace.as_str(), Quoted::Strip);
        line = strip_block_comments(&line);
        for namespace in &included {
            line = strip_qualifier(&line, namespace.as_str(), Quoted::Keep);
        }

        let line = line.trim();
        if !line.is_empty() {
            adapted.push(line.to_string());
        }
    }

    if adapted.last().is_some_and(|last| last.trim() == "}") {
        adapted.pop();
    }
    adapted
}

/// `export enum X {` / `export class X ...` for an indented first-level
/// declaration of one of the source's own symbols.
fn export_header<'a>(raw: &'a str, symbols: &DeclaredSymbols) -> Option<(&'a str, String)> {
    let body = raw.trim_start();
    if body.len() == raw.len() {
        return None;
    }

    let (keyword, after) = if let Some(after) = strip_keyword(body, "enum") {
        ("enum", after)
    } else {
        ("class", strip_keyword(body, "class")?)
    };
    let name = take_word(after);
    let declared = match keyword {
        "enum" => symbols.enums.contains(name),
        _ => symbols.is_class(name),
    };
    if name.is_empty() || !declared {
        return None;
    }

    let tail = after[name.len()..].trim_start();
    let opens_body = tail.starts_with('{')
        || (keyword == "class" && strip_keyword(tail, "extends").is_some());
    opens_body.then(|| (name, format!("export {keyword} {name} {tail}")))
}
