//! Spatio-temporal snow classification (second EBSnoR pass)
//!
//! A falling flake crossing a pixel produces a positive isolated onset
//! followed shortly, at the same or a nearby pixel, by a negative isolated
//! offset. Every negative isolated event is matched against the cache of
//! recent positive isolated events; a match marks the negative event, the
//! matched positive events and (optionally) all their trailing events as
//! snow.

use crate::ev_core::Event;
use crate::ev_filtering::config::EbsnorConfig;
use crate::ev_filtering::isolated::TrailingLinks;
use crate::ev_filtering::position_cache::PositionCache;
use tracing::{debug, instrument};

/// Outcome of matching one negative isolated event against the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<'a> {
    /// No positive isolated event within the time window
    NoMatch,
    /// The event's own cell matched (adaptive window only)
    SameCellMatch(usize),
    /// Every cell of the spatial window that matched
    NeighborMatches(&'a [usize]),
}

impl MatchResult<'_> {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchResult::NoMatch)
    }

    /// Indices of the matched positive isolated events
    pub fn candidates(&self) -> &[usize] {
        match self {
            MatchResult::NoMatch => &[],
            MatchResult::SameCellMatch(index) => std::slice::from_ref(index),
            MatchResult::NeighborMatches(indices) => indices,
        }
    }
}

/// Counts produced by one snow pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnowSummary {
    /// Negative isolated events that found a match
    pub matched_offsets: usize,
    /// Matches resolved on the originating cell
    pub same_cell_matches: usize,
}

/// Second pass of the filter, owning the padded position cache
#[derive(Debug, Clone)]
pub struct SnowClassifier {
    cache: PositionCache,
    candidates: Vec<usize>,
    time_window: u64,
    adaptive_window: bool,
    label_propagation: bool,
}

impl SnowClassifier {
    pub fn new(config: &EbsnorConfig) -> Self {
        let side = 2 * config.spatial_window_radius as usize + 1;
        Self {
            cache: PositionCache::new(config),
            candidates: Vec::with_capacity(side * side),
            time_window: config.time_threshold,
            adaptive_window: config.adaptive_window,
            label_propagation: config.label_propagation,
        }
    }

    /// Clear the position cache
    pub fn reset(&mut self) {
        self.cache.reset();
        self.candidates.clear();
    }

    /// Match a negative isolated event at padded coordinate (px, py)
    pub fn find_match(&mut self, px: u16, py: u16, timestamp: u64) -> MatchResult<'_> {
        let window = self.time_window;

        if self.adaptive_window {
            if let Some(entry) = self.cache.get(px, py) {
                if entry.within(timestamp, window) {
                    return MatchResult::SameCellMatch(entry.index);
                }
            }
        }

        self.candidates.clear();
        self.candidates.extend(
            self.cache
                .window(px, py)
                .filter(|entry| entry.within(timestamp, window))
                .map(|entry| entry.index),
        );

        if self.candidates.is_empty() {
            MatchResult::NoMatch
        } else {
            MatchResult::NeighborMatches(&self.candidates)
        }
    }

    /// Flag snow events
    ///
    /// `events` must carry coordinates shifted by the spatial window radius.
    /// `is_isolated` and `links` come from the isolated-event pass over the
    /// same batch. `is_snow` is overwritten.
    #[instrument(skip_all, fields(n_events = events.len()))]
    pub fn classify(
        &mut self,
        events: &[Event],
        is_isolated: &[bool],
        links: &TrailingLinks,
        is_snow: &mut Vec<bool>,
    ) -> SnowSummary {
        is_snow.clear();
        is_snow.resize(events.len(), false);

        let propagate = self.label_propagation;
        let mut summary = SnowSummary::default();

        for (index, event) in events.iter().enumerate() {
            if !is_isolated[index] {
                // Trailing events only become snow through their parent
                continue;
            }

            if event.is_negative() {
                let matched = self.find_match(event.x, event.y, event.t);
                if !matched.is_match() {
                    continue;
                }
                if let MatchResult::SameCellMatch(_) = matched {
                    summary.same_cell_matches += 1;
                }
                summary.matched_offsets += 1;

                mark_snow(is_snow, links, index, propagate);
                for &candidate in matched.candidates() {
                    mark_snow(is_snow, links, candidate, propagate);
                }
            } else {
                self.cache.record(event.x, event.y, event.t, index);
            }
        }

        debug!(
            matched_offsets = summary.matched_offsets,
            same_cell_matches = summary.same_cell_matches,
            "Snow pass complete"
        );
        summary
    }
}

fn mark_snow(is_snow: &mut [bool], links: &TrailingLinks, index: usize, propagate: bool) {
    is_snow[index] = true;
    if propagate {
        for &trailing in links.get(index) {
            is_snow[trailing] = true;
        }
    }
}
