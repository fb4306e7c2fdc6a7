//! Tracing setup for binaries built on this crate.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "chaingarden=info";

/// Installs a formatted subscriber filtered by `RUST_LOG`.
///
/// Falls back to [`DEFAULT_FILTER`] when `RUST_LOG` is unset or invalid.
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_ok()
}
