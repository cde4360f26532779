//! Event filtering module for ebsnor
//!
//! This module implements EBSnoR, a filter that removes events triggered by
//! falling snow from an event camera stream while preserving scene events.
//!
//! # Algorithm
//!
//! - **Isolated-event pass**: each event is tagged *isolated* (polarity change
//!   or long gap at its pixel) or *trailing* (a quick same-polarity repeat).
//!   Trailing events are linked to the isolated event they follow, up to
//!   `te_depth` links each.
//! - **Snow pass**: a negative isolated event that follows a positive isolated
//!   event at the same or a nearby pixel within the time window is snow. The
//!   matched positive events and the trailing events of every matched event
//!   are snow as well.
//! - **Compaction**: snow events are dropped, the rest keep their order.
//!
//! # Usage
//!
//! ```rust
//! use ebsnor::ev_core::Event;
//! use ebsnor::ev_filtering::{CameraDims, EbsnorConfig, EbsnorFilter};
//!
//! let config = EbsnorConfig::new(10_000, CameraDims::new(1280, 720))
//!     .with_spatial_window_radius(1)
//!     .with_adaptive_window(true);
//! let mut filter = EbsnorFilter::new(config.clone()).unwrap();
//!
//! let events = vec![Event::new(10, 10, 0, 1), Event::new(11, 10, 80, -1)];
//! let mut filtered = filter.process(&events).unwrap();
//! config.restore_coordinates(&mut filtered);
//! assert!(filtered.is_empty());
//! ```

use crate::ev_core::Events;
use std::fmt;

// Sub-modules
pub mod config;
pub mod ebsnor;
pub mod evaluation;
pub mod isolated;
pub mod pixel_state;
pub mod position_cache;
pub mod snow;
pub mod validation;

// Re-export core types and functions for convenience
pub use config::{CameraDims, EbsnorConfig, FilterError, FilterResult, Validatable};
pub use ebsnor::{
    classify_snow_events, filter_snow, filter_snow_with_stats, EbsnorFilter, SnowClassification,
};
pub use evaluation::{evaluate, ConfusionCounts};
pub use isolated::{IsolatedEventClassifier, TrailingLinks};
pub use snow::{MatchResult, SnowClassifier};
pub use validation::validate_batch;

/// Apply a single filter type to events
pub fn apply_single_filter<F>(events: &Events, filter: F) -> FilterResult<Events>
where
    F: SingleFilter,
{
    filter.apply(events)
}

/// Trait for individual filter implementations
pub trait SingleFilter {
    /// Apply this filter to a set of events
    fn apply(&self, events: &Events) -> FilterResult<Events>;

    /// Get a description of this filter
    fn description(&self) -> String;

    /// Check if this filter is enabled/configured
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Statistics about filtering operations
#[derive(Debug, Clone)]
pub struct FilterStats {
    /// Original number of events
    pub input_count: usize,
    /// Final number of events after filtering
    pub output_count: usize,
    /// Number of events removed
    pub removed_count: usize,
    /// Fraction of events removed (0.0 to 1.0)
    pub removal_fraction: f64,
    /// Processing time in seconds
    pub processing_time: f64,
    /// Events processed per second
    pub throughput: f64,
}

impl FilterStats {
    /// Create new filter statistics
    pub fn new(input_count: usize, output_count: usize, processing_time: f64) -> Self {
        let removed_count = input_count.saturating_sub(output_count);
        let removal_fraction = if input_count > 0 {
            removed_count as f64 / input_count as f64
        } else {
            0.0
        };
        let throughput = if processing_time > 0.0 {
            input_count as f64 / processing_time
        } else {
            0.0
        };

        Self {
            input_count,
            output_count,
            removed_count,
            removal_fraction,
            processing_time,
            throughput,
        }
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Filter Stats: {} -> {} events ({:.1}% removed) in {:.3}s ({:.0} events/s)",
            self.input_count,
            self.output_count,
            self.removal_fraction * 100.0,
            self.processing_time,
            self.throughput
        )
    }
}

/// Ready-made configurations
pub mod presets {
    use super::*;

    /// Same-pixel matching, the fastest variant
    pub fn per_pixel(time_threshold: u64, dims: CameraDims) -> EbsnorConfig {
        EbsnorConfig::new(time_threshold, dims)
    }

    /// Full spatial window around each negative event
    pub fn spatial_window(time_threshold: u64, radius: u16, dims: CameraDims) -> EbsnorConfig {
        EbsnorConfig::new(time_threshold, dims).with_spatial_window_radius(radius)
    }

    /// Same-pixel check first, spatial window only on a miss
    pub fn adaptive_window(time_threshold: u64, radius: u16, dims: CameraDims) -> EbsnorConfig {
        spatial_window(time_threshold, radius, dims).with_adaptive_window(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ev_core::{Event, NEGATIVE, POSITIVE};

    #[test]
    fn test_filter_stats() {
        let stats = FilterStats::new(5, 3, 0.5);
        assert_eq!(stats.removed_count, 2);
        assert!((stats.removal_fraction - 0.4).abs() < 0.001);
        assert!((stats.throughput - 10.0).abs() < 0.001);

        let empty = FilterStats::new(0, 0, 0.0);
        assert_eq!(empty.removal_fraction, 0.0);
        assert_eq!(empty.throughput, 0.0);
    }

    #[test]
    fn test_filter_stats_display() {
        let stats = FilterStats::new(10, 5, 1.0);
        assert_eq!(
            stats.to_string(),
            "Filter Stats: 10 -> 5 events (50.0% removed) in 1.000s (10 events/s)"
        );
    }

    #[test]
    fn test_presets() {
        let dims = CameraDims::new(64, 64);
        assert_eq!(presets::per_pixel(100, dims).spatial_window_radius, 0);
        assert_eq!(presets::spatial_window(100, 2, dims).spatial_window_radius, 2);
        let adaptive = presets::adaptive_window(100, 2, dims);
        assert!(adaptive.adaptive_window);
        assert!(adaptive.validate().is_ok());
    }

    #[test]
    fn test_apply_single_filter() {
        let events = vec![Event::new(1, 1, 0, POSITIVE), Event::new(1, 1, 5, NEGATIVE)];
        let config = presets::per_pixel(100, CameraDims::new(4, 4));
        let filtered = apply_single_filter(&events, config).unwrap();
        assert!(filtered.is_empty());
    }
}
