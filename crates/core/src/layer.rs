//! Layer definitions and the vocabulary that drives their heuristics.

use crate::readiness::Thresholds;
use serde::{Deserialize, Serialize};

/// One stage of refinement, frozen at template construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub id: String,
    pub name: String,
    pub description: String,

    /// What the user should concentrate on at this layer
    pub focus: String,

    /// Default follow-up questions, used when the service cannot supply any
    pub questions: Vec<String>,

    /// How to move from this layer to the next one
    pub transition: String,

    /// True iff no layer follows this one
    pub is_output_layer: bool,

    /// Keyword tables for detection, extraction and scoring
    pub vocabulary: LayerVocabulary,

    /// Resolved readiness cut-points (declared or positional default)
    pub thresholds: Thresholds,
}

/// Declarative keyword data for one layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerVocabulary {
    /// Keywords suggesting a raw idea already sits at this layer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<String>,

    /// Phrase → branch rules
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ExtractionRule>,

    /// Weighted readiness signals
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<ReadinessSignal>,

    /// Overrides the positional default thresholds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
}

/// Several phrasings mapping to one `(label, value)` branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRule {
    pub label: String,
    pub value: String,
    pub phrases: Vec<String>,
}

impl ExtractionRule {
    pub fn new(label: &str, value: &str, phrases: &[&str]) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// A category of terms that moves the readiness score when matched.
///
/// Each distinct matching term adds `weight`, up to `max_hits` terms.
/// Negative weights penalize (e.g. vagueness).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessSignal {
    pub name: String,
    pub terms: Vec<String>,
    pub weight: f32,
    #[serde(default = "default_max_hits")]
    pub max_hits: usize,
}

fn default_max_hits() -> usize {
    1
}

impl ReadinessSignal {
    pub fn new(name: &str, weight: f32, terms: &[&str]) -> Self {
        Self {
            name: name.into(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
            weight,
            max_hits: 1,
        }
    }

    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }
}
