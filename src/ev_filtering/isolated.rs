//! Isolated-event classification (first EBSnoR pass)
//!
//! An event is *isolated* when its polarity differs from the previous event
//! at the same pixel, or when more than `time_threshold` ticks separate the
//! two. Any other event *trails* the last isolated event at its pixel and is
//! linked to it, up to `te_depth` links per isolated event. Events beyond
//! that capacity are neither isolated nor linked.

use crate::ev_core::Event;
use crate::ev_filtering::config::EbsnorConfig;
use crate::ev_filtering::pixel_state::PixelStateGrid;
use tracing::{debug, instrument};

/// Bounded trailing-event lists, one per isolated event
///
/// Each isolated event owns a fixed block of `depth` slots in a shared
/// arena. Pushing into a full block is refused, which is how the
/// `te_depth` capacity is enforced.
#[derive(Debug, Clone)]
pub struct TrailingLinks {
    depth: usize,
    slot_of: Vec<Option<usize>>,
    counts: Vec<usize>,
    links: Vec<usize>,
}

impl TrailingLinks {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            slot_of: Vec::new(),
            counts: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Drop all links and size the index table for a batch of `n_events`
    pub fn reset(&mut self, n_events: usize) {
        self.slot_of.clear();
        self.slot_of.resize(n_events, None);
        self.counts.clear();
        self.links.clear();
    }

    /// Reserve an empty list for isolated event `parent`
    pub fn open(&mut self, parent: usize) {
        if self.slot_of[parent].is_some() {
            return;
        }
        self.slot_of[parent] = Some(self.counts.len());
        self.counts.push(0);
        self.links.resize(self.links.len() + self.depth, 0);
    }

    /// Link trailing event `child` to `parent`
    ///
    /// Returns `false`, leaving the list untouched, when `parent` has no list
    /// or its list already holds `depth` entries.
    pub fn push(&mut self, parent: usize, child: usize) -> bool {
        let Some(slot) = self.slot_of.get(parent).copied().flatten() else {
            return false;
        };
        let count = &mut self.counts[slot];
        if *count >= self.depth {
            return false;
        }
        self.links[slot * self.depth + *count] = child;
        *count += 1;
        true
    }

    /// Trailing events linked to `parent`, in arrival order
    pub fn get(&self, parent: usize) -> &[usize] {
        match self.slot_of.get(parent).copied().flatten() {
            Some(slot) => {
                let start = slot * self.depth;
                &self.links[start..start + self.counts[slot]]
            }
            None => &[],
        }
    }

    /// Number of isolated events with a list
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of linked trailing events
    pub fn linked_count(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Counts produced by one isolated-event pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsolationSummary {
    pub isolated: usize,
    pub linked: usize,
    pub unlinked: usize,
}

/// First pass of the filter, owning the per-pixel state grid
#[derive(Debug, Clone)]
pub struct IsolatedEventClassifier {
    grid: PixelStateGrid,
    time_threshold: u64,
    enabled: bool,
}

impl IsolatedEventClassifier {
    pub fn new(config: &EbsnorConfig) -> Self {
        Self {
            grid: PixelStateGrid::new(config.camera_dimensions),
            time_threshold: config.time_threshold,
            enabled: config.isolation_filter,
        }
    }

    /// Return the pixel grid to its sentinel state
    pub fn reset(&mut self) {
        self.grid.reset();
    }

    /// Tag every event as isolated or trailing and build trailing links
    ///
    /// `events` must carry sensor (unshifted) coordinates that have already
    /// been validated. `is_isolated` and `links` are overwritten.
    #[instrument(skip_all, fields(n_events = events.len()))]
    pub fn classify(
        &mut self,
        events: &[Event],
        is_isolated: &mut Vec<bool>,
        links: &mut TrailingLinks,
    ) -> IsolationSummary {
        is_isolated.clear();
        is_isolated.resize(events.len(), false);
        links.reset(events.len());

        let mut summary = IsolationSummary::default();

        if !self.enabled {
            is_isolated.fill(true);
            summary.isolated = events.len();
            debug!("Isolation filter disabled, every event treated as isolated");
            return summary;
        }

        for (index, event) in events.iter().enumerate() {
            let state = self.grid.get_mut(event.x, event.y);
            let gap = event.t.saturating_sub(state.prev_timestamp);

            if event.polarity != state.prev_polarity || gap > self.time_threshold {
                is_isolated[index] = true;
                state.last_isolated_index = index;
                links.open(index);
                summary.isolated += 1;
            } else if links.push(state.last_isolated_index, index) {
                summary.linked += 1;
            } else {
                summary.unlinked += 1;
            }

            state.prev_polarity = event.polarity;
            state.prev_timestamp = event.t;
        }

        debug!(
            isolated = summary.isolated,
            linked = summary.linked,
            unlinked = summary.unlinked,
            "Isolated-event pass complete"
        );
        summary
    }
}
