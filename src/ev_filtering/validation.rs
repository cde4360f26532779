//! Batch validation run before classification
//!
//! A batch is checked once, in full, before any scratch state is touched.
//! The first offending event is reported; a rejected batch leaves no partial
//! state behind.

use crate::ev_core::Event;
use crate::ev_filtering::config::{EbsnorConfig, FilterError, FilterResult};
use tracing::{debug, instrument};

/// Validate a batch against the sensor geometry and ordering contract
///
/// Checks, per event and in order:
/// - coordinates lie on the sensor (`InvalidCoordinate`),
/// - polarity is -1 or +1 (`InvalidPolarity`),
/// - timestamps do not decrease, when `require_monotonic_timestamps` is set
///   (`NonMonotonicBatch`).
#[instrument(skip(events, config), fields(n_events = events.len()))]
pub fn validate_batch(events: &[Event], config: &EbsnorConfig) -> FilterResult<()> {
    let dims = config.camera_dimensions;
    let mut previous: Option<u64> = None;

    for (index, event) in events.iter().enumerate() {
        if !dims.contains(event.x, event.y) {
            return Err(FilterError::InvalidCoordinate {
                index,
                x: event.x,
                y: event.y,
                width: dims.width,
                height: dims.height,
            });
        }

        if event.polarity != 1 && event.polarity != -1 {
            return Err(FilterError::InvalidPolarity {
                index,
                polarity: event.polarity,
            });
        }

        if config.require_monotonic_timestamps {
            if let Some(prev) = previous {
                if event.t < prev {
                    return Err(FilterError::NonMonotonicBatch {
                        index,
                        previous: prev,
                        timestamp: event.t,
                    });
                }
            }
            previous = Some(event.t);
        }
    }

    debug!("Batch validated");
    Ok(())
}
