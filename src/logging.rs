//! logging — stderr subscriber for `tracing` events.
//!
//! The library itself only emits events (`info!` per iteration when verbose,
//! `warn!` on a failed line search, `debug!` for setup). Rust callers
//! install whatever subscriber they like; the Python entry point uses
//! [`init_stderr`] so progress shows up on the console.
//!
//! The subscriber is installed once per process, but its level sits behind
//! a reload layer, so every call re-applies the caller's verbosity.
use std::sync::OnceLock;

use tracing_subscriber::{
    Registry,
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
    reload,
};

type LevelHandle = reload::Handle<LevelFilter, Registry>;

/// `None` when another global subscriber was already in place.
static LEVEL: OnceLock<Option<LevelHandle>> = OnceLock::new();

/// Level used by [`init_stderr`]: `INFO` when verbose, `WARN` otherwise.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::INFO } else { LevelFilter::WARN }
}

fn install(level: LevelFilter) -> Option<LevelHandle> {
    let (filter, handle) = reload::Layer::new(level);
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .compact();

    tracing_subscriber::registry().with(filter).with(stderr_layer).try_init().ok()?;
    Some(handle)
}

/// Install a compact stderr subscriber as the global default, or switch the
/// installed one to the level for `verbose`.
///
/// Returns `false` if a foreign global subscriber was already set (for
/// example by the embedding application); that one is left untouched.
pub fn init_stderr(verbose: bool) -> bool {
    let level = level_for(verbose);
    match LEVEL.get_or_init(|| install(level)) {
        Some(handle) => handle.modify(|filter| *filter = level).is_ok(),
        None => false,
    }
}
