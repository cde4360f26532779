//! Synthetic snowfall over background activity
//!
//! Each flake crossing the sensor is modelled as a positive onset at one
//! pixel, a few positive repeats at that pixel, and a negative offset at the
//! same or a nearby pixel shortly afterwards. Background events are spread
//! uniformly over the sensor and the time span. Every event carries a
//! ground-truth snow label.

use crate::ev_core::{Event, Events, NEGATIVE, POSITIVE};
use crate::ev_filtering::{CameraDims, FilterError, FilterResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};
use tracing::{debug, instrument};

/// Synthetic snowfall configuration
#[derive(Debug, Clone)]
pub struct SnowfallConfig {
    /// Sensor resolution
    pub camera_dimensions: CameraDims,
    /// Time span over which flake onsets and background events are drawn
    pub duration: u64,
    /// Number of flakes
    pub flake_count: usize,
    /// Positive repeats emitted after each onset
    pub trailing_per_flake: usize,
    /// Ticks between consecutive repeats
    pub trailing_interval: u64,
    /// Ticks between onset and offset
    pub onset_to_offset: u64,
    /// Maximum offset displacement along each axis, in pixels
    pub max_drift: u16,
    /// Number of background events
    pub background_count: usize,
    /// Random seed for reproducibility (None for random)
    pub seed: Option<u64>,
}

impl Default for SnowfallConfig {
    fn default() -> Self {
        Self {
            camera_dimensions: CameraDims::default(),
            duration: 1_000_000,
            flake_count: 1_000,
            trailing_per_flake: 2,
            trailing_interval: 20,
            onset_to_offset: 300,
            max_drift: 1,
            background_count: 10_000,
            seed: None,
        }
    }
}

impl SnowfallConfig {
    pub fn new(camera_dimensions: CameraDims, duration: u64) -> Self {
        Self {
            camera_dimensions,
            duration,
            ..Self::default()
        }
    }

    pub fn with_flakes(mut self, count: usize) -> Self {
        self.flake_count = count;
        self
    }

    pub fn with_trailing(mut self, per_flake: usize, interval: u64) -> Self {
        self.trailing_per_flake = per_flake;
        self.trailing_interval = interval;
        self
    }

    pub fn with_onset_to_offset(mut self, ticks: u64) -> Self {
        self.onset_to_offset = ticks;
        self
    }

    pub fn with_max_drift(mut self, pixels: u16) -> Self {
        self.max_drift = pixels;
        self
    }

    pub fn with_background(mut self, count: usize) -> Self {
        self.background_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> FilterResult<()> {
        if self.camera_dimensions.area() == 0 {
            return Err(FilterError::InvalidConfig(
                "Snowfall sensor must have non-zero dimensions".to_string(),
            ));
        }
        if self.duration == 0 {
            return Err(FilterError::InvalidConfig(
                "Snowfall duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Events with per-event ground-truth snow labels
#[derive(Debug, Clone, Default)]
pub struct LabeledEvents {
    pub events: Events,
    pub is_snow: Vec<bool>,
}

impl LabeledEvents {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn snow_count(&self) -> usize {
        self.is_snow.iter().filter(|&&snow| snow).count()
    }
}

/// Move `value` by `delta` pixels, staying on an axis of `size` pixels
fn drift(value: u16, delta: i32, size: u16) -> u16 {
    (value as i32 + delta).clamp(0, size as i32 - 1) as u16
}

/// Generate a labelled, time-sorted batch of snow and background events
#[instrument(skip(config), fields(flakes = config.flake_count, background = config.background_count))]
pub fn generate_snowfall(config: &SnowfallConfig) -> FilterResult<LabeledEvents> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let CameraDims { width, height } = config.camera_dimensions;
    let x_dist = Uniform::new(0, width);
    let y_dist = Uniform::new(0, height);
    let t_dist = Uniform::new(0, config.duration);
    let max_drift = config.max_drift as i32;

    let per_flake = config.trailing_per_flake + 2;
    let mut labeled: Vec<(Event, bool)> =
        Vec::with_capacity(config.flake_count * per_flake + config.background_count);

    for _ in 0..config.flake_count {
        let x = x_dist.sample(&mut rng);
        let y = y_dist.sample(&mut rng);
        let onset = t_dist.sample(&mut rng);

        labeled.push((Event::new(x, y, onset, POSITIVE), true));
        for k in 1..=config.trailing_per_flake as u64 {
            let t = onset + k * config.trailing_interval;
            labeled.push((Event::new(x, y, t, POSITIVE), true));
        }

        let dx = rng.gen_range(-max_drift..=max_drift);
        let dy = rng.gen_range(-max_drift..=max_drift);
        labeled.push((
            Event::new(
                drift(x, dx, width),
                drift(y, dy, height),
                onset + config.onset_to_offset,
                NEGATIVE,
            ),
            true,
        ));
    }

    for _ in 0..config.background_count {
        let polarity = if rng.gen_bool(0.5) { POSITIVE } else { NEGATIVE };
        labeled.push((
            Event::new(
                x_dist.sample(&mut rng),
                y_dist.sample(&mut rng),
                t_dist.sample(&mut rng),
                polarity,
            ),
            false,
        ));
    }

    // Stable: a flake's own events keep their emission order on ties
    labeled.sort_by_key(|(event, _)| event.t);

    let (events, is_snow): (Events, Vec<bool>) = labeled.into_iter().unzip();
    debug!(n_events = events.len(), "Generated synthetic snowfall");

    Ok(LabeledEvents { events, is_snow })
}
