//! Tracing configuration and initialization for ebsnor
//!
//! The filter logs through the `tracing` crate. These helpers install a
//! `tracing-subscriber` formatter so applications and tests can see those
//! logs and control their verbosity through `RUST_LOG`.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn,ebsnor=info";

/// Initialize tracing with default configuration
///
/// - Logs to stderr in compact form
/// - Respects the RUST_LOG environment variable
/// - Default level: INFO for ebsnor, WARN for everything else
///
/// # Examples
///
/// ```rust
/// use ebsnor::tracing_config;
///
/// tracing_config::init();
///
/// // RUST_LOG=ebsnor=debug cargo run    # per-pass debug output
/// // RUST_LOG=ebsnor=warn cargo run     # silence batch summaries
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter)
        .init();
}

/// Initialize tracing with debug configuration
///
/// Shows the per-pass debug events of the filter, with file names and
/// line numbers, in the pretty multi-line format.
pub fn init_debug() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ebsnor=debug"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();
}

/// Initialize tracing with custom filter
///
/// # Arguments
///
/// * `filter` - EnvFilter string (e.g., "ebsnor::ev_filtering::snow=trace")
///
/// # Examples
///
/// ```rust
/// use ebsnor::tracing_config;
///
/// // Only the isolated-event pass
/// tracing_config::init_with_filter("ebsnor::ev_filtering::isolated=debug");
/// ```
pub fn init_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter)
        .init();
}

/// Initialize tracing for testing
///
/// Output goes through the test writer so it is captured per test. Safe to
/// call from every test; only the first call installs a subscriber.
pub fn init_test() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_test_writer())
        .with(EnvFilter::new(DEFAULT_FILTER))
        .try_init();
}
