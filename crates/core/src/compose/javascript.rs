//! CommonJS module composition from namespace-qualified JavaScript.

use std::collections::BTreeSet;

use super::{ComposedModule, MissingSymbol, ModuleContext, join_lines};
use crate::idl::DeclarationKind;
use crate::js_scan::{AssignedValue, Assignment, assignments};
use crate::namespace::Namespace;

/// Re-package every declaration of `ctx.source` found in `raw_js` as an
/// exported member of a CommonJS module.
///
/// Enums come first, then structs and exceptions, then service clients, each
/// group in name order. Declarations without generated code are reported in
/// [`ComposedModule::missing`].
pub fn compose_javascript(ctx: &ModuleContext<'_>, raw_js: &str) -> ComposedModule {
    let found = assignments(raw_js, ctx.namespace.as_str());
    let mut lines = import_lines(ctx);
    let mut missing = Vec::new();

    for name in &ctx.symbols.enums {
        match find_object(&found, name) {
            Some(body) => lines.push(format!("exports.{name} = {{ {} }}", body.trim())),
            None => missing.push(MissingSymbol::new(DeclarationKind::Enum, name)),
        }
    }

    for name in ctx.symbols.types() {
        let exception = ctx.symbols.is_exception(name);
        match find_function(&found, name) {
            Some(ctor) => lines.extend(type_closure(&found, name, ctor, exception)),
            None => {
                let kind = if exception {
                    DeclarationKind::Exception
                } else {
                    DeclarationKind::Struct
                };
                missing.push(MissingSymbol::new(kind, name));
            }
        }
    }

    for service in &ctx.symbols.services {
        let client = format!("{service}Client");
        match find_function(&found, &client) {
            Some(ctor) => lines.extend(service_closure(&found, service, &client, ctor)),
            None => missing.push(MissingSymbol::new(DeclarationKind::Service, service)),
        }
    }

    ComposedModule {
        text: join_lines(&lines),
        missing,
    }
}

/// `var <ns> = require ('<project>/<ns>');` for every included namespace and
/// the module's own.
fn import_lines(ctx: &ModuleContext<'_>) -> Vec<String> {
    let mut namespaces: BTreeSet<&Namespace> = ctx.includes.namespaces();
    namespaces.insert(ctx.namespace);
    namespaces
        .into_iter()
        .map(|ns| format!("var {ns} = require ('{}');", ctx.module_path(ns)))
        .collect()
}

fn find_object<'a>(found: &[Assignment<'a>], target: &str) -> Option<&'a str> {
    found.iter().find_map(|assignment| match assignment.value {
        AssignedValue::Object(body) if assignment.target == target => Some(body),
        _ => None,
    })
}

fn find_function<'a>(found: &[Assignment<'a>], target: &str) -> Option<&'a str> {
    found.iter().find_map(|assignment| match assignment.value {
        AssignedValue::Function(rest) if assignment.target == target => Some(rest),
        _ => None,
    })
}

/// Whether `target` is `<owner>.prototype.<member>` with `member` starting
/// with one of `prefixes`. An empty prefix list also accepts the bare
/// `<owner>.prototype` assignment.
fn is_prototype_member(target: &str, owner: &str, prefixes: &[&str]) -> bool {
    let Some(rest) = target
        .strip_prefix(owner)
        .and_then(|rest| rest.strip_prefix(".prototype"))
    else {
        return false;
    };
    if prefixes.is_empty() {
        return rest.is_empty() || rest.starts_with('.');
    }
    rest.strip_prefix('.')
        .is_some_and(|member| prefixes.iter().any(|prefix| member.starts_with(prefix)))
}

fn type_closure(found: &[Assignment<'_>], name: &str, ctor: &str, exception: bool) -> Vec<String> {
    let mut lines = vec![
        format!("exports.{name} = (function () {{ function {name}{ctor}"),
        format!("{name}.prototype = {{}};"),
    ];
    if exception {
        lines.push(format!("Thrift.inherits({name}, Thrift.TException);"));
        lines.push(format!("{name}.prototype.name = '{name}';"));
    }
    lines.extend(
        found
            .iter()
            .filter(|a| is_prototype_member(a.target, name, &["read", "write"]))
            .map(|a| format!("{};", a.unqualified)),
    );
    lines.push(format!("return {name};"));
    lines.push("})();".to_string());
    lines.push(String::new());
    lines
}

fn service_closure(
    found: &[Assignment<'_>],
    service: &str,
    client: &str,
    ctor: &str,
) -> Vec<String> {
    let rpc_prefix = format!("{service}_");
    let mut lines = vec![
        format!("exports.{client} = (function () {{"),
        format!("function {client}{ctor}"),
    ];
    lines.extend(
        found
            .iter()
            .filter(|a| {
                a.root().starts_with(&rpc_prefix) && matches!(a.value, AssignedValue::Function(_))
            })
            .map(|a| format!("{};", a.statement)),
    );
    lines.extend(
        found
            .iter()
            .filter(|a| is_prototype_member(a.target, client, &[]))
            .map(|a| format!("{};", a.unqualified)),
    );
    lines.push(format!("return {client};"));
    lines.push("})();".to_string());
    lines.push(String::new());
    lines
}
