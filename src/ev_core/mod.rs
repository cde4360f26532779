// Core event data structures and types
// This module defines the fundamental data structures consumed by the snow filter

/// Polarity value of an ON (brightness increase) event
pub const POSITIVE: i8 = 1;

/// Polarity value of an OFF (brightness decrease) event
pub const NEGATIVE: i8 = -1;

/// Core event data structure.
/// Represents a single event from an event camera.
///
/// Timestamps are integer ticks; every event of one batch must use the same
/// unit (microseconds for Prophesee recordings). Polarity is carried as a
/// signed byte so that malformed input can be detected and rejected by
/// [`crate::ev_filtering::validate_batch`] instead of being silently coerced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    pub t: u64,        // timestamp (ticks, same unit across a batch)
    pub x: u16,        // x coordinate (pixel column)
    pub y: u16,        // y coordinate (pixel row)
    pub polarity: i8,  // +1 for ON events, -1 for OFF events
}

impl Event {
    pub fn new(x: u16, y: u16, t: u64, polarity: i8) -> Self {
        Self { t, x, y, polarity }
    }

    /// True for ON events
    pub fn is_positive(&self) -> bool {
        self.polarity > 0
    }

    /// True for OFF events
    pub fn is_negative(&self) -> bool {
        self.polarity < 0
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.x, self.y, self.t, self.polarity)
    }
}

/// A collection of events
pub type Events = Vec<Event>;

/// Create an empty list of events with a pre-allocated capacity
pub fn events_with_capacity(capacity: usize) -> Events {
    Events::with_capacity(capacity)
}

/// Check whether timestamps are non-decreasing
pub fn is_sorted_by_time(events: &[Event]) -> bool {
    events.windows(2).all(|pair| pair[0].t <= pair[1].t)
}
