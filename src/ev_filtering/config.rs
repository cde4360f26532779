//! Filter configuration and error handling
//!
//! This module defines the configuration of the EBSnoR snow filter and the
//! error type shared by every filtering operation.

use crate::ev_core::Events;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default time threshold in timestamp ticks (10ms for microsecond timestamps)
pub const DEFAULT_TIME_THRESHOLD: u64 = 10_000;

/// Default number of trailing events linked to one isolated event
pub const DEFAULT_TE_DEPTH: usize = 10;

/// Largest coordinate representable by [`crate::ev_core::Event`]
const COORDINATE_LIMIT: usize = u16::MAX as usize + 1;

/// Result type for filtering operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Error types for filtering operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid filter configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid coordinate at event {index}: ({x}, {y}) outside {width}x{height} sensor")]
    InvalidCoordinate {
        index: usize,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },

    #[error("Invalid polarity at event {index}: {polarity} (expected -1 or +1)")]
    InvalidPolarity { index: usize, polarity: i8 },

    #[error("Non-monotonic batch at event {index}: timestamp {timestamp} after {previous}")]
    NonMonotonicBatch {
        index: usize,
        previous: u64,
        timestamp: u64,
    },

    #[error("Invalid input data: {0}")]
    InvalidInput(String),
}

/// Trait for validatable configurations
pub trait Validatable {
    /// Validate this configuration
    fn validate(&self) -> FilterResult<()>;
}

/// Sensor resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDims {
    pub width: u16,
    pub height: u16,
}

impl CameraDims {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Number of pixels on the sensor
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether (x, y) lies on the sensor
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }
}

impl Default for CameraDims {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl fmt::Display for CameraDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Configuration of the EBSnoR snow filter
///
/// `time_threshold` is expressed in the timestamp unit of the batches the
/// filter will see. It is used both to separate isolated events from their
/// trailing repeats and as the window in which a negative isolated event
/// must follow a positive one to be classified as snow.
///
/// # Example
///
/// ```rust
/// use ebsnor::ev_filtering::{CameraDims, EbsnorConfig};
///
/// let config = EbsnorConfig::new(10_000, CameraDims::new(1280, 720))
///     .with_spatial_window_radius(2)
///     .with_adaptive_window(true);
/// assert_eq!(config.padded_dimensions(), (1284, 724));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EbsnorConfig {
    /// Isolation threshold and correlation window, in timestamp ticks
    pub time_threshold: u64,
    /// Half-width of the spatial neighbourhood (0 for same-pixel matching)
    pub spatial_window_radius: u16,
    /// Check the originating pixel before scanning the neighbourhood
    pub adaptive_window: bool,
    /// Maximum number of trailing events linked to one isolated event
    pub te_depth: usize,
    /// Sensor resolution
    pub camera_dimensions: CameraDims,
    /// Propagate snow labels from isolated events to their trailing events
    pub label_propagation: bool,
    /// Separate isolated events from trailing events; when disabled every
    /// event is treated as isolated
    pub isolation_filter: bool,
    /// Reject batches whose timestamps decrease
    pub require_monotonic_timestamps: bool,
}

impl Default for EbsnorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_THRESHOLD, CameraDims::default())
    }
}

impl EbsnorConfig {
    /// Create a configuration with the default window settings
    pub fn new(time_threshold: u64, camera_dimensions: CameraDims) -> Self {
        Self {
            time_threshold,
            spatial_window_radius: 0,
            adaptive_window: false,
            te_depth: DEFAULT_TE_DEPTH,
            camera_dimensions,
            label_propagation: true,
            isolation_filter: true,
            require_monotonic_timestamps: true,
        }
    }

    pub fn with_time_threshold(mut self, time_threshold: u64) -> Self {
        self.time_threshold = time_threshold;
        self
    }

    pub fn with_spatial_window_radius(mut self, radius: u16) -> Self {
        self.spatial_window_radius = radius;
        self
    }

    pub fn with_adaptive_window(mut self, enable: bool) -> Self {
        self.adaptive_window = enable;
        self
    }

    pub fn with_te_depth(mut self, depth: usize) -> Self {
        self.te_depth = depth;
        self
    }

    pub fn with_camera_dimensions(mut self, dims: CameraDims) -> Self {
        self.camera_dimensions = dims;
        self
    }

    pub fn with_label_propagation(mut self, enable: bool) -> Self {
        self.label_propagation = enable;
        self
    }

    pub fn with_isolation_filter(mut self, enable: bool) -> Self {
        self.isolation_filter = enable;
        self
    }

    pub fn with_monotonic_check(mut self, enable: bool) -> Self {
        self.require_monotonic_timestamps = enable;
        self
    }

    /// Size (width, height) of the grid padded by the spatial window radius
    /// on each side
    pub fn padded_dimensions(&self) -> (usize, usize) {
        let pad = 2 * self.spatial_window_radius as usize;
        (
            self.camera_dimensions.width as usize + pad,
            self.camera_dimensions.height as usize + pad,
        )
    }

    /// Undo the coordinate shift applied by the filter
    ///
    /// Filtered events keep their coordinates shifted by
    /// `+spatial_window_radius`; call this before handing them to consumers
    /// that expect sensor coordinates.
    pub fn restore_coordinates(&self, events: &mut Events) {
        let radius = self.spatial_window_radius;
        if radius == 0 {
            return;
        }
        for event in events.iter_mut() {
            event.x = event.x.saturating_sub(radius);
            event.y = event.y.saturating_sub(radius);
        }
    }

    /// Get a description of this configuration
    pub fn description(&self) -> String {
        let mut parts = vec![
            format!("threshold={}", self.time_threshold),
            format!("radius={}", self.spatial_window_radius),
            format!("te_depth={}", self.te_depth),
            format!("sensor={}", self.camera_dimensions),
        ];
        if self.adaptive_window {
            parts.push("adaptive".to_string());
        }
        if !self.label_propagation {
            parts.push("no label propagation".to_string());
        }
        if !self.isolation_filter {
            parts.push("no isolation filter".to_string());
        }
        parts.join(", ")
    }
}

impl Validatable for EbsnorConfig {
    fn validate(&self) -> FilterResult<()> {
        if self.time_threshold == 0 {
            return Err(FilterError::InvalidConfig(
                "Time threshold must be positive".to_string(),
            ));
        }

        if self.te_depth == 0 {
            return Err(FilterError::InvalidConfig(
                "Trailing event depth must be positive".to_string(),
            ));
        }

        let CameraDims { width, height } = self.camera_dimensions;
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidConfig(format!(
                "Camera dimensions must be non-zero, got {}",
                self.camera_dimensions
            )));
        }

        // Shifted coordinates must still fit in an event's u16 fields
        let radius = self.spatial_window_radius as usize;
        if width as usize + radius > COORDINATE_LIMIT || height as usize + radius > COORDINATE_LIMIT
        {
            return Err(FilterError::InvalidConfig(format!(
                "Spatial window radius {} too large for {} sensor",
                radius, self.camera_dimensions
            )));
        }

        Ok(())
    }
}
