//! Event-based snow removal for event camera streams
//!
//! `ebsnor` removes events produced by falling snowflakes from a
//! time-ordered batch of camera events, keeping scene events in order.
//! See [`ev_filtering`] for the algorithm and [`ev_simulation`] for a
//! labelled synthetic snowfall generator.

// Core modules
pub mod ev_core;
pub mod ev_filtering;
pub mod ev_simulation;
pub mod tracing_config;

// Re-export core types for easier usage
pub use ev_core::{Event, Events};
pub use ev_filtering::{
    classify_snow_events, filter_snow, filter_snow_with_stats, CameraDims, EbsnorConfig,
    EbsnorFilter, FilterError, FilterResult, FilterStats, SnowClassification,
};

/// Returns the version of the library
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
