//! Bias Insight Aggregator: reconciles several findings into one worst-case verdict.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::bias::models::{AnalysisKind, BiasFinding, Confidence, Evidence, RiskLevel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentSummary {
    pub analysis: AnalysisKind,
    /// Protected attribute for demographic and score findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_attribute: Option<String>,
    pub detected: bool,
    pub bias_score: f64,
    pub confidence: Confidence,
}

impl ConstituentSummary {
    fn of(finding: &BiasFinding) -> Self {
        let protected_attribute = match &finding.evidence {
            Evidence::Demographic(e) => Some(e.protected_attribute.clone()),
            Evidence::Score(e) => Some(e.protected_attribute.clone()),
            _ => None,
        };
        Self {
            analysis: finding.analysis,
            protected_attribute,
            detected: finding.detected,
            bias_score: finding.bias_score,
            confidence: finding.confidence,
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        self.analysis
            .cmp(&other.analysis)
            .then_with(|| self.protected_attribute.cmp(&other.protected_attribute))
            .then_with(|| self.bias_score.total_cmp(&other.bias_score))
            .then_with(|| self.detected.cmp(&other.detected))
            .then_with(|| self.confidence.cmp(&other.confidence))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEvidence {
    pub risk_level: RiskLevel,
    pub analyses_run: usize,
    pub constituents: Vec<ConstituentSummary>,
}

fn severity_header(risk: RiskLevel, detected: bool) -> &'static str {
    match risk {
        RiskLevel::High => "High bias risk: immediate action required",
        RiskLevel::Medium => "Moderate bias risk: review recommended",
        RiskLevel::Low if detected => "Minor bias indicators: monitor closely",
        RiskLevel::Low => "No significant bias detected",
    }
}

/// Merges `findings` into one: worst-case score, any-detected, most confident constituent.
///
/// The result does not depend on input order.
pub fn aggregate(findings: &[BiasFinding]) -> BiasFinding {
    if findings.is_empty() {
        return BiasFinding::new(
            AnalysisKind::Aggregate,
            false,
            0.0,
            Confidence::None,
            Evidence::Aggregate(AggregateEvidence {
                risk_level: RiskLevel::Low,
                analyses_run: 0,
                constituents: Vec::new(),
            }),
            vec!["No analyses were run".to_string()],
        );
    }

    let bias_score = findings.iter().map(|f| f.bias_score).fold(0.0, f64::max);
    let detected = findings.iter().any(|f| f.detected);
    let confidence = findings
        .iter()
        .map(|f| f.confidence)
        .max()
        .unwrap_or(Confidence::None);
    let risk_level = RiskLevel::from_score(bias_score);

    let mut ranked: Vec<(ConstituentSummary, &BiasFinding)> = findings
        .iter()
        .map(|f| (ConstituentSummary::of(f), f))
        .collect();
    ranked.sort_by(|(a, fa), (b, fb)| {
        b.bias_score
            .total_cmp(&a.bias_score)
            .then_with(|| a.order(b))
            .then_with(|| fa.recommendations.cmp(&fb.recommendations))
    });

    // Most severe finding first; each finding keeps its own recommendation order.
    let header = severity_header(risk_level, detected);
    let mut seen = HashSet::from([header]);
    let recommendations = std::iter::once(header)
        .chain(
            ranked
                .iter()
                .flat_map(|(_, f)| f.recommendations.iter().map(String::as_str))
                .filter(|r| seen.insert(*r)),
        )
        .map(str::to_string)
        .collect();

    let mut constituents: Vec<ConstituentSummary> =
        ranked.into_iter().map(|(summary, _)| summary).collect();
    constituents.sort_by(ConstituentSummary::order);

    BiasFinding::new(
        AnalysisKind::Aggregate,
        detected,
        bias_score,
        confidence,
        Evidence::Aggregate(AggregateEvidence {
            risk_level,
            analyses_run: findings.len(),
            constituents,
        }),
        recommendations,
    )
}
