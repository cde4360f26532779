//! Event stream simulation
//!
//! Synthetic, labelled event streams used to exercise and benchmark the snow
//! filter without recorded data.

pub mod snowfall;

pub use snowfall::{generate_snowfall, LabeledEvents, SnowfallConfig};
