//! Module composition engine for Apache Thrift JavaScript/TypeScript output.
//!
//! The Thrift compiler emits every declaration of an IDL file as a property of
//! one namespace-qualified global. This crate turns that output into
//! self-contained modules:
//!
//! - [`namespace`]: `namespace js` extraction and include resolution
//! - [`idl`]: declaration capture from IDL sources
//! - [`js_scan`]: top-level statement scanning of generated JavaScript
//! - [`compose`]: CommonJS and TypeScript module composition
//!
//! Nothing here touches the compiler or the output tree; see `t2ng-cli`.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

pub mod compose;
mod error;
pub mod idl;
pub mod js_scan;
pub mod namespace;
mod text;

pub use compose::javascript::compose_javascript;
pub use compose::typescript::compose_typescript;
pub use compose::{ComposedModule, MissingSymbol, ModuleContext};
pub use error::{Error, Result};
pub use idl::{DeclarationKind, DeclaredSymbols, IdlSource};
pub use namespace::{
    IncludeDirs, IncludeEdge, Namespace, ResolvedIncludes, extract_namespace, resolve_includes,
};
