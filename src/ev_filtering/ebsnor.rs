//! EBSnoR filter pipeline
//!
//! Runs the isolated-event pass and the snow pass over one batch, then
//! compacts the batch by dropping snow events. All scratch state is owned by
//! [`EbsnorFilter`] and reset at the start of every batch; nothing carries
//! over from one batch to the next.
//!
//! # Coordinate contract
//!
//! With `spatial_window_radius > 0` the surviving events keep coordinates
//! shifted by `+radius`. Use [`EbsnorConfig::restore_coordinates`] to return
//! them to sensor coordinates.
//!
//! # Example
//!
//! ```rust
//! use ebsnor::ev_core::Event;
//! use ebsnor::ev_filtering::{filter_snow, CameraDims, EbsnorConfig};
//!
//! let config = EbsnorConfig::new(10_000, CameraDims::new(640, 480));
//! let events = vec![
//!     Event::new(5, 5, 0, 1),
//!     Event::new(5, 5, 50, 1),
//!     Event::new(5, 5, 200, -1),
//!     Event::new(9, 9, 300, 1),
//! ];
//! let filtered = filter_snow(&events, &config).unwrap();
//! assert_eq!(filtered, vec![Event::new(9, 9, 300, 1)]);
//! ```

use crate::ev_core::{Event, Events};
use crate::ev_filtering::config::{EbsnorConfig, FilterResult, Validatable};
use crate::ev_filtering::isolated::{IsolatedEventClassifier, TrailingLinks};
use crate::ev_filtering::snow::SnowClassifier;
use crate::ev_filtering::validation::validate_batch;
use crate::ev_filtering::{FilterStats, SingleFilter};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Per-event verdicts of both passes over one batch
#[derive(Debug, Clone)]
pub struct SnowClassification {
    pub is_isolated: Vec<bool>,
    pub trailing_links: TrailingLinks,
    pub is_snow: Vec<bool>,
}

impl SnowClassification {
    pub fn len(&self) -> usize {
        self.is_snow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_snow.is_empty()
    }

    pub fn snow_count(&self) -> usize {
        self.is_snow.iter().filter(|&&snow| snow).count()
    }

    pub fn isolated_count(&self) -> usize {
        self.is_isolated.iter().filter(|&&isolated| isolated).count()
    }
}

/// Reusable EBSnoR filter
///
/// Allocates its grids once for the configured sensor and reuses them for
/// every batch.
#[derive(Debug, Clone)]
pub struct EbsnorFilter {
    config: EbsnorConfig,
    isolated: IsolatedEventClassifier,
    snow: SnowClassifier,
    links: TrailingLinks,
    is_isolated: Vec<bool>,
    is_snow: Vec<bool>,
    shifted: Events,
}

impl EbsnorFilter {
    /// Create a filter, rejecting an invalid configuration
    pub fn new(config: EbsnorConfig) -> FilterResult<Self> {
        config.validate()?;
        debug!(config = %config.description(), "Creating EBSnoR filter");

        Ok(Self {
            isolated: IsolatedEventClassifier::new(&config),
            snow: SnowClassifier::new(&config),
            links: TrailingLinks::new(config.te_depth),
            is_isolated: Vec::new(),
            is_snow: Vec::new(),
            shifted: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &EbsnorConfig {
        &self.config
    }

    /// Return every piece of scratch state to its initial value
    pub fn reset(&mut self) {
        self.isolated.reset();
        self.snow.reset();
        self.links.reset(0);
        self.is_isolated.clear();
        self.is_snow.clear();
        self.shifted.clear();
    }

    /// Validate the batch and run both passes, leaving results in scratch
    fn run(&mut self, events: &[Event]) -> FilterResult<()> {
        validate_batch(events, &self.config)?;
        self.reset();

        self.isolated.classify(events, &mut self.is_isolated, &mut self.links);

        let radius = self.config.spatial_window_radius;
        self.shifted.extend(events.iter().map(|event| Event {
            x: event.x + radius,
            y: event.y + radius,
            ..*event
        }));

        self.snow.classify(
            &self.shifted,
            &self.is_isolated,
            &self.links,
            &mut self.is_snow,
        );
        Ok(())
    }

    /// Classify a batch without compacting it
    #[instrument(skip(self, events), fields(n_events = events.len()))]
    pub fn classify(&mut self, events: &[Event]) -> FilterResult<SnowClassification> {
        self.run(events)?;

        Ok(SnowClassification {
            is_isolated: std::mem::take(&mut self.is_isolated),
            trailing_links: std::mem::replace(
                &mut self.links,
                TrailingLinks::new(self.config.te_depth),
            ),
            is_snow: std::mem::take(&mut self.is_snow),
        })
    }

    /// Remove snow events from a batch, preserving the order of the rest
    ///
    /// Output coordinates are shifted by the spatial window radius.
    #[instrument(skip(self, events), fields(n_events = events.len()))]
    pub fn process(&mut self, events: &[Event]) -> FilterResult<Events> {
        let start_time = Instant::now();

        if events.is_empty() {
            debug!("No events to filter");
            return Ok(Vec::new());
        }

        self.run(events)?;

        let filtered: Events = self
            .shifted
            .iter()
            .zip(&self.is_snow)
            .filter(|&(_, &snow)| !snow)
            .map(|(event, _)| *event)
            .collect();

        let input_count = events.len();
        let output_count = filtered.len();
        let removed_count = input_count - output_count;

        info!(
            "EBSnoR ({}): {} -> {} events ({} removed, {:.1}% reduction) in {:.3}s",
            self.config.description(),
            input_count,
            output_count,
            removed_count,
            (removed_count as f64 / input_count as f64) * 100.0,
            start_time.elapsed().as_secs_f64()
        );

        Ok(filtered)
    }

    /// Remove snow events and report statistics
    pub fn process_with_stats(&mut self, events: &[Event]) -> FilterResult<(Events, FilterStats)> {
        let start_time = Instant::now();
        let filtered = self.process(events)?;
        let stats = FilterStats::new(
            events.len(),
            filtered.len(),
            start_time.elapsed().as_secs_f64(),
        );
        Ok((filtered, stats))
    }
}

impl SingleFilter for EbsnorConfig {
    fn apply(&self, events: &Events) -> FilterResult<Events> {
        filter_snow(events, self)
    }

    fn description(&self) -> String {
        format!("EBSnoR filter: {}", EbsnorConfig::description(self))
    }
}

/// Classify one batch with fresh state
pub fn classify_snow_events(
    events: &[Event],
    config: &EbsnorConfig,
) -> FilterResult<SnowClassification> {
    EbsnorFilter::new(config.clone())?.classify(events)
}

/// Remove snow events from one batch with fresh state
///
/// Output coordinates are shifted by `config.spatial_window_radius`.
pub fn filter_snow(events: &[Event], config: &EbsnorConfig) -> FilterResult<Events> {
    EbsnorFilter::new(config.clone())?.process(events)
}

/// Remove snow events from one batch and report statistics
pub fn filter_snow_with_stats(
    events: &[Event],
    config: &EbsnorConfig,
) -> FilterResult<(Events, FilterStats)> {
    EbsnorFilter::new(config.clone())?.process_with_stats(events)
}
