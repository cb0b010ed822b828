//! Log output setup.
//!
//! Everything in the crate logs through `tracing`. Lines carry a short area
//! prefix so related events group together when grepping:
//!
//! ```text
//! 2026-02-11T21:33:12.000Z  INFO campusnet::connections: connection-accept: alice -> bob
//! ```
//!
//! The filter comes from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        tracing::info!("logging-test: subscriber installed");
    }
}
