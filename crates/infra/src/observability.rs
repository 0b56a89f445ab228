//! Tracing initialisation.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Respects `RUST_LOG`; defaults to `info` for this crate family when the
/// variable is unset. Calling it twice is harmless, the second call is a
/// no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slotbook=debug"));

    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
