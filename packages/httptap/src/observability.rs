// packages/httptap/src/observability.rs
//! Tracing setup and metric names
//!
//! The crate only emits `tracing` events and `metrics` counters; installing
//! a subscriber or a metrics recorder is up to the host. [`init_tracing`] is
//! a convenience for test binaries.

use tracing_subscriber::EnvFilter;

/// Counter of resolved requests, labelled by `outcome`
/// (`fixed`, `handler`, `unmatched`, `rejected`, `pass_through`)
pub const REQUESTS_TOTAL: &str = "httptap_requests_total";

/// Counter of registered expectations, labelled by `strategy`
pub const REGISTRATIONS_TOTAL: &str = "httptap_registrations_total";

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "httptap=info";

/// Install a global fmt subscriber writing to the test harness
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing(json: bool) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
    };

    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(false);
        assert!(!init_tracing(false));
        assert!(!init_tracing(true));
    }
}
