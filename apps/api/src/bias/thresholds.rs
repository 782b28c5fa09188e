use serde::{Deserialize, Serialize};

/// Hiring-rate gap cut-offs for the four-level parity scale.
/// A gap below `low` is "none"; at or above `high` is "high".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParityThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for ParityThresholds {
    fn default() -> Self {
        Self {
            low: 0.05,
            medium: 0.15,
            high: 0.25,
        }
    }
}

/// Per-field score flag rules: absolute points, fraction of observed range, and the smaller
/// absolute gap that still counts when the difference is statistically significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreThresholds {
    pub absolute_disparity: f64,
    pub relative_disparity: f64,
    pub significant_disparity: f64,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            absolute_disparity: 10.0,
            relative_disparity: 0.15,
            significant_disparity: 5.0,
        }
    }
}

/// Immutable tuning for one `BiasEngine`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub significance_alpha: f64,
    pub parity: ParityThresholds,
    pub score: ScoreThresholds,
    /// Fill missing outcomes with alternating hired/rejected placeholders.
    /// Demo datasets only; findings built on them are flagged and capped at low confidence.
    pub allow_synthetic_outcomes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            significance_alpha: 0.05,
            parity: ParityThresholds::default(),
            score: ScoreThresholds::default(),
            allow_synthetic_outcomes: false,
        }
    }
}
