//! Readiness status and the thresholds that produce it.

use serde::{Deserialize, Serialize};

/// How ready a text is for the layer it is being judged at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStatus {
    Red,
    Yellow,
    Green,
}

impl ReadinessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessStatus::Red => "red",
            ReadinessStatus::Yellow => "yellow",
            ReadinessStatus::Green => "green",
        }
    }
}

impl std::fmt::Display for ReadinessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score cut-points for one layer.
///
/// `green` and `yellow` select the status; a score below `red` means the
/// text carries nothing usable for the layer yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub red: f32,
    pub yellow: f32,
    pub green: f32,
}

impl Thresholds {
    pub const FIRST: Thresholds = Thresholds { red: 0.2, yellow: 0.5, green: 0.7 };
    pub const MIDDLE: Thresholds = Thresholds { red: 0.3, yellow: 0.6, green: 0.8 };
    pub const LAST: Thresholds = Thresholds { red: 0.4, yellow: 0.7, green: 0.9 };

    /// Default thresholds by position: earlier layers are more lenient.
    pub fn for_position(index: usize, layer_count: usize) -> Self {
        if index == 0 {
            Self::FIRST
        } else if index + 1 >= layer_count {
            Self::LAST
        } else {
            Self::MIDDLE
        }
    }

    pub fn classify(&self, score: f32) -> ReadinessStatus {
        if score >= self.green {
            ReadinessStatus::Green
        } else if score >= self.yellow {
            ReadinessStatus::Yellow
        } else {
            ReadinessStatus::Red
        }
    }

    pub fn is_below_floor(&self, score: f32) -> bool {
        score < self.red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_thresholds() {
        assert_eq!(Thresholds::for_position(0, 4), Thresholds::FIRST);
        assert_eq!(Thresholds::for_position(1, 4), Thresholds::MIDDLE);
        assert_eq!(Thresholds::for_position(2, 4), Thresholds::MIDDLE);
        assert_eq!(Thresholds::for_position(3, 4), Thresholds::LAST);
        // A single layer is first before it is last.
        assert_eq!(Thresholds::for_position(0, 1), Thresholds::FIRST);
    }

    #[test]
    fn classify_boundaries() {
        let t = Thresholds::FIRST;
        assert_eq!(t.classify(0.0), ReadinessStatus::Red);
        assert_eq!(t.classify(0.49), ReadinessStatus::Red);
        assert_eq!(t.classify(0.5), ReadinessStatus::Yellow);
        assert_eq!(t.classify(0.7), ReadinessStatus::Green);
        assert!(t.is_below_floor(0.1));
        assert!(!t.is_below_floor(0.2));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ReadinessStatus::Yellow).unwrap(), "\"yellow\"");
        assert_eq!(ReadinessStatus::Green.to_string(), "green");
    }
}
