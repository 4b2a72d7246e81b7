//! Tracing setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding the log level or filter directive.
pub const LOG_ENV: &str = "T2NG_LOG";

const CRATES: [&str; 2] = ["t2ng_cli", "t2ng_core"];

/// Install a stderr `fmt` subscriber filtered by [`LOG_ENV`].
///
/// `T2NG_LOG` controls log level: "trace", "debug", "info", "warn", "error"
/// or a full tracing filter spec like "t2ng_cli=debug,t2ng_core=warn".
pub fn init_tracing() {
    let filter = filter_directive(std::env::var(LOG_ENV).ok().as_deref());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// Filter directive for the value of [`LOG_ENV`], if set.
pub fn filter_directive(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(level) if is_plain_level(level) => scoped(&level.to_ascii_lowercase()),
        Some(spec) if !spec.is_empty() => spec.to_string(),
        _ => scoped("info"),
    }
}

fn scoped(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
