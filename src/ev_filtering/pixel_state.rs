//! Dense per-pixel scratch state for the isolated-event pass
//!
//! The grid covers the unpadded sensor: the isolated-event pass runs on
//! sensor coordinates, before the spatial window shift is applied.

use crate::ev_filtering::config::CameraDims;
use ndarray::Array2;

/// Polarity stored before any event has been seen at a pixel.
/// Distinct from both real polarities, so a pixel's first event is isolated.
pub const SENTINEL_POLARITY: i8 = 0;

/// Scratch state of one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelState {
    /// Timestamp of the previous event at this pixel
    pub prev_timestamp: u64,
    /// Polarity of the previous event at this pixel
    pub prev_polarity: i8,
    /// Batch index of the last isolated event at this pixel
    pub last_isolated_index: usize,
}

impl Default for PixelState {
    fn default() -> Self {
        Self {
            prev_timestamp: 0,
            prev_polarity: SENTINEL_POLARITY,
            last_isolated_index: 0,
        }
    }
}

/// Row-major grid of [`PixelState`], indexed as `[[y, x]]`
#[derive(Debug, Clone)]
pub struct PixelStateGrid {
    states: Array2<PixelState>,
}

impl PixelStateGrid {
    pub fn new(dims: CameraDims) -> Self {
        Self {
            states: Array2::from_elem(
                (dims.height as usize, dims.width as usize),
                PixelState::default(),
            ),
        }
    }

    /// Return every pixel to the sentinel state
    pub fn reset(&mut self) {
        self.states.fill(PixelState::default());
    }

    /// (width, height) of the grid
    pub fn dimensions(&self) -> (usize, usize) {
        let (rows, cols) = self.states.dim();
        (cols, rows)
    }

    pub fn get(&self, x: u16, y: u16) -> &PixelState {
        &self.states[[y as usize, x as usize]]
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> &mut PixelState {
        &mut self.states[[y as usize, x as usize]]
    }
}
