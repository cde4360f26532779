//! Evaluation of snow predictions against ground-truth labels
//!
//! Counts true/false positives and negatives of the snow verdicts, treating
//! "snow" as the positive class, and derives the usual success rates.

use crate::ev_core::Event;
use crate::ev_filtering::config::{EbsnorConfig, FilterError, FilterResult};
use crate::ev_filtering::ebsnor::classify_snow_events;
use std::fmt;
use tracing::{info, instrument};

/// Confusion matrix of snow predictions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ConfusionCounts {
    /// Compare predicted snow flags with ground-truth snow flags
    pub fn from_masks(predicted: &[bool], ground_truth: &[bool]) -> FilterResult<Self> {
        if predicted.len() != ground_truth.len() {
            return Err(FilterError::InvalidInput(format!(
                "Prediction length {} does not match ground truth length {}",
                predicted.len(),
                ground_truth.len()
            )));
        }

        let mut counts = Self::default();
        for (&pred, &truth) in predicted.iter().zip(ground_truth) {
            match (pred, truth) {
                (true, true) => counts.tp += 1,
                (true, false) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (false, true) => counts.fn_ += 1,
            }
        }
        Ok(counts)
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// Events labelled snow
    pub fn ground_truth_snow(&self) -> usize {
        self.tp + self.fn_
    }

    /// Events labelled as scene
    pub fn ground_truth_scene(&self) -> usize {
        self.fp + self.tn
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn true_positive_rate(&self) -> f64 {
        ratio(self.tp, self.ground_truth_snow())
    }

    pub fn false_positive_rate(&self) -> f64 {
        ratio(self.fp, self.ground_truth_scene())
    }

    pub fn true_negative_rate(&self) -> f64 {
        ratio(self.tn, self.ground_truth_scene())
    }

    pub fn false_negative_rate(&self) -> f64 {
        ratio(self.fn_, self.ground_truth_snow())
    }
}

impl fmt::Display for ConfusionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TP={} FP={} TN={} FN={} (TPR {:.3}, FPR {:.3}, accuracy {:.3})",
            self.tp,
            self.fp,
            self.tn,
            self.fn_,
            self.true_positive_rate(),
            self.false_positive_rate(),
            self.accuracy()
        )
    }
}

/// Classify a labelled batch and score the verdicts
#[instrument(skip(events, ground_truth, config), fields(n_events = events.len()))]
pub fn evaluate(
    events: &[Event],
    ground_truth: &[bool],
    config: &EbsnorConfig,
) -> FilterResult<ConfusionCounts> {
    if events.len() != ground_truth.len() {
        return Err(FilterError::InvalidInput(format!(
            "{} events but {} ground-truth labels",
            events.len(),
            ground_truth.len()
        )));
    }

    let classification = classify_snow_events(events, config)?;
    let counts = ConfusionCounts::from_masks(&classification.is_snow, ground_truth)?;
    info!("Evaluation ({}): {}", config.description(), counts);
    Ok(counts)
}
