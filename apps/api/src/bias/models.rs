//! Output data model shared by every analyzer.

use serde::{Deserialize, Serialize};

use crate::bias::aggregate::AggregateEvidence;
use crate::bias::demographic::DemographicEvidence;
use crate::bias::normalizer::UnresolvedField;
use crate::bias::numeric::unit_interval;
use crate::bias::scores::ScoreEvidence;
use crate::bias::text::TextEvidence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Demographic,
    Score,
    Text,
    Aggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

impl Confidence {
    /// high ≥ 50, medium ≥ 20, low otherwise.
    pub fn from_sample_size(n: usize) -> Self {
        match n {
            n if n >= 50 => Confidence::High,
            n if n >= 20 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

/// Four-level parity scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasLevel {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// high > 0.7, medium > 0.3, low otherwise.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s > 0.7 => RiskLevel::High,
            s if s > 0.3 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

/// Structured detail behind a finding. Tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    InsufficientData {
        sample_size: usize,
        required: usize,
        reason: String,
    },
    MissingField {
        requested: Vec<String>,
        available_columns: Vec<String>,
        reason: String,
    },
    Demographic(DemographicEvidence),
    Score(ScoreEvidence),
    Text(TextEvidence),
    Aggregate(AggregateEvidence),
}

/// The engine's standard output unit. One per analyzer invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasFinding {
    pub analysis: AnalysisKind,
    pub detected: bool,
    /// Magnitude in [0, 1]; never NaN.
    pub bias_score: f64,
    pub confidence: Confidence,
    pub evidence: Evidence,
    pub recommendations: Vec<String>,
}

impl BiasFinding {
    pub fn new(
        analysis: AnalysisKind,
        detected: bool,
        bias_score: f64,
        confidence: Confidence,
        evidence: Evidence,
        recommendations: Vec<String>,
    ) -> Self {
        Self {
            analysis,
            detected,
            bias_score: unit_interval(bias_score),
            confidence,
            evidence,
            recommendations,
        }
    }

    /// Placeholder for samples too small to analyze: not detected, low confidence.
    pub fn insufficient_data(
        analysis: AnalysisKind,
        sample_size: usize,
        required: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            analysis,
            false,
            0.0,
            Confidence::Low,
            Evidence::InsufficientData {
                sample_size,
                required,
                reason: reason.into(),
            },
            vec![
                "Collect more candidate data for robust bias analysis".to_string(),
                "Monitor hiring patterns as dataset grows".to_string(),
                "Implement bias-aware evaluation processes".to_string(),
            ],
        )
    }

    /// A requested column could not be found under any alias.
    pub fn missing_field(
        analysis: AnalysisKind,
        requested: Vec<String>,
        available_columns: Vec<String>,
        reason: impl Into<String>,
    ) -> Self {
        let recommendation = format!(
            "Provide a {} field (or a known alias) to enable this analysis",
            requested.join(" / ")
        );
        Self::new(
            analysis,
            false,
            0.0,
            Confidence::None,
            Evidence::MissingField {
                requested,
                available_columns,
                reason: reason.into(),
            },
            vec![recommendation],
        )
    }

    pub fn unresolved(analysis: AnalysisKind, err: UnresolvedField) -> Self {
        let reason = err.to_string();
        Self::missing_field(analysis, vec![err.requested], err.available_columns, reason)
    }
}
