//! Readiness assessment: how ready is a text for a given layer?
//!
//! The score is built from a length base, the layer's weighted signals and a
//! short-text penalty, then clamped to `[0, 1]` and classified with the
//! layer's thresholds. The function is pure: equal inputs, equal output.

use altitude_core::{LayerDefinition, ReadinessStatus};
use serde::{Deserialize, Serialize};

use crate::text::{contains_term, word_count};

/// Words needed for the full length base.
const BASE_WORDS: f32 = 30.0;
const BASE_CAP: f32 = 0.3;

/// Result of assessing one text at one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub score: f32,
    pub status: ReadinessStatus,
    /// Score is under the layer's red floor
    pub below_floor: bool,
}

/// Score `text` against `layer`.
pub fn assess(text: &str, layer: &LayerDefinition) -> Assessment {
    let score = score(text, layer);
    Assessment {
        score,
        status: layer.thresholds.classify(score),
        below_floor: layer.thresholds.is_below_floor(score),
    }
}

fn score(text: &str, layer: &LayerDefinition) -> f32 {
    let words = word_count(text);
    if words == 0 {
        return 0.0;
    }
    let lower = text.to_lowercase();

    let mut score = (words as f32 / BASE_WORDS).min(BASE_CAP);

    for signal in &layer.vocabulary.signals {
        let hits = signal
            .terms
            .iter()
            .filter(|term| contains_term(&lower, term))
            .count()
            .min(signal.max_hits);
        score += signal.weight * hits as f32;
    }

    if words < 5 {
        score -= 0.3;
    } else if words < 10 {
        score -= 0.1;
    }

    score.clamp(0.0, 1.0)
}
