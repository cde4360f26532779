//! Cache of the most recent positive isolated event per padded pixel
//!
//! The cache is padded by the spatial window radius on each side, so a
//! `(2r+1)x(2r+1)` window centred on any shifted sensor coordinate stays
//! inside the grid and needs no bounds clipping.

use crate::ev_filtering::config::EbsnorConfig;
use ndarray::{s, Array2};

/// Last positive isolated event recorded in a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedPositive {
    pub timestamp: u64,
    pub index: usize,
}

impl CachedPositive {
    /// Whether an event at `timestamp` falls strictly inside `window` after
    /// this one
    pub fn within(&self, timestamp: u64, window: u64) -> bool {
        timestamp.saturating_sub(self.timestamp) < window
    }
}

/// Padded grid of [`CachedPositive`]; an empty cell stands for a timestamp
/// of minus infinity and never matches
#[derive(Debug, Clone)]
pub struct PositionCache {
    cells: Array2<Option<CachedPositive>>,
    radius: usize,
}

impl PositionCache {
    pub fn new(config: &EbsnorConfig) -> Self {
        let (width, height) = config.padded_dimensions();
        Self {
            cells: Array2::from_elem((height, width), None),
            radius: config.spatial_window_radius as usize,
        }
    }

    /// Clear every cell
    pub fn reset(&mut self) {
        self.cells.fill(None);
    }

    /// (width, height) of the padded grid
    pub fn dimensions(&self) -> (usize, usize) {
        let (rows, cols) = self.cells.dim();
        (cols, rows)
    }

    /// Record a positive isolated event at padded coordinate (px, py)
    pub fn record(&mut self, px: u16, py: u16, timestamp: u64, index: usize) {
        self.cells[[py as usize, px as usize]] = Some(CachedPositive { timestamp, index });
    }

    /// Entry of the cell at padded coordinate (px, py)
    pub fn get(&self, px: u16, py: u16) -> Option<CachedPositive> {
        self.cells[[py as usize, px as usize]]
    }

    /// Every populated cell of the window centred on padded coordinate
    /// (px, py); the centre must lie at least `radius` cells from the border
    pub fn window(&self, px: u16, py: u16) -> impl Iterator<Item = CachedPositive> + '_ {
        let (px, py, r) = (px as usize, py as usize, self.radius);
        self.cells
            .slice(s![py - r..py + r + 1, px - r..px + r + 1])
            .into_iter()
            .flatten()
            .copied()
    }
}
