//! Composite reports built from the individual analyzers.
//!
//! - `comprehensive`: text plus (for larger candidate lists) parity and score analyses
//! - `insights`: parity across gender, ethnicity and age group with a hiring-rate summary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bias::aggregate::aggregate;
use crate::bias::demographic::analyze_demographic_bias;
use crate::bias::models::{BiasFinding, RiskLevel};
use crate::bias::normalizer::{infer_outcome, normalize, NormalizeOptions, RawCandidate};
use crate::bias::numeric::ratio;
use crate::bias::scores::analyze_score_bias;
use crate::bias::text::analyze_text;
use crate::bias::thresholds::EngineConfig;

/// Candidate lists must be longer than this before statistics are run in a comprehensive report.
pub const COMPREHENSIVE_MIN_CANDIDATES: usize = 5;
pub const INSIGHTS_MIN_CANDIDATES: usize = 5;
const INSIGHT_ATTRIBUTES: [&str; 3] = ["gender", "ethnicity", "age_group"];

fn default_protected_attributes() -> Vec<String> {
    vec!["gender".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComprehensiveRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: Option<RawCandidate>,
    #[serde(default)]
    pub candidates: Vec<RawCandidate>,
    #[serde(default = "default_protected_attributes")]
    pub protected_attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasReport {
    pub overall: BiasFinding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<BiasFinding>,
    /// Keyed by protected attribute.
    pub demographic: BTreeMap<String, BiasFinding>,
    pub scores: BTreeMap<String, BiasFinding>,
}

pub fn comprehensive(request: &ComprehensiveRequest, config: &EngineConfig) -> BiasReport {
    let text = request
        .text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(|t| analyze_text(t, request.metadata.as_ref()));

    let mut demographic = BTreeMap::new();
    let mut scores = BTreeMap::new();
    if request.candidates.len() > COMPREHENSIVE_MIN_CANDIDATES {
        for attribute in &request.protected_attributes {
            demographic.insert(
                attribute.clone(),
                analyze_demographic_bias(&request.candidates, attribute, config),
            );
            scores.insert(
                attribute.clone(),
                analyze_score_bias(&request.candidates, attribute, config),
            );
        }
    }

    let constituents: Vec<BiasFinding> = text
        .iter()
        .chain(demographic.values())
        .chain(scores.values())
        .cloned()
        .collect();
    debug!(analyses = constituents.len(), "Comprehensive bias report assembled");

    BiasReport {
        overall: aggregate(&constituents),
        text,
        demographic,
        scores,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasInsights {
    pub total_candidates: usize,
    pub message: String,
    pub overall_bias_score: f64,
    /// Hired share of candidates whose outcome could be inferred.
    pub overall_hiring_rate: f64,
    pub risk_level: RiskLevel,
    pub demographic_analysis: BTreeMap<String, BiasFinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_analysis: Option<BiasFinding>,
    pub recommendations: Vec<String>,
}

pub fn insights(candidates: &[RawCandidate], config: &EngineConfig) -> BiasInsights {
    let total_candidates = candidates.len();
    if total_candidates < INSIGHTS_MIN_CANDIDATES {
        return BiasInsights {
            total_candidates,
            message: "Insufficient data for statistical analysis".to_string(),
            overall_bias_score: 0.0,
            overall_hiring_rate: 0.0,
            risk_level: RiskLevel::Low,
            demographic_analysis: BTreeMap::new(),
            score_analysis: None,
            recommendations: Vec::new(),
        };
    }

    let mut demographic_analysis = BTreeMap::new();
    for attribute in INSIGHT_ATTRIBUTES {
        // Age groups are optional: skip silently when no record carries a usable age.
        if attribute == "age_group"
            && normalize(candidates, attribute, NormalizeOptions::default()).is_err()
        {
            debug!("No usable ages; skipping age_group parity");
            continue;
        }
        demographic_analysis.insert(
            attribute.to_string(),
            analyze_demographic_bias(candidates, attribute, config),
        );
    }
    let score_analysis = analyze_score_bias(candidates, "gender", config);

    let all: Vec<BiasFinding> = demographic_analysis
        .values()
        .chain(std::iter::once(&score_analysis))
        .cloned()
        .collect();
    let overall = aggregate(&all);

    BiasInsights {
        total_candidates,
        message: format!(
            "Analyzed {total_candidates} candidates across {} protected attribute(s)",
            demographic_analysis.len()
        ),
        overall_bias_score: overall.bias_score,
        overall_hiring_rate: overall_hiring_rate(candidates),
        risk_level: RiskLevel::from_score(overall.bias_score),
        demographic_analysis,
        score_analysis: Some(score_analysis),
        recommendations: overall.recommendations,
    }
}

fn overall_hiring_rate(candidates: &[RawCandidate]) -> f64 {
    let (hired, known) = candidates
        .iter()
        .filter_map(|c| infer_outcome(c).0)
        .fold((0usize, 0usize), |(h, n), o| (h + usize::from(o.is_hired()), n + 1));
    ratio(hired as f64, known as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bias::models::Evidence;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawCandidate {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn pool(n: usize) -> Vec<RawCandidate> {
        (0..n)
            .map(|i| {
                raw(json!({
                    "id": i,
                    "gender": if i % 2 == 0 { "F" } else { "M" },
                    "ethnicity": if i % 3 == 0 { "X" } else { "Y" },
                    "age": 25 + (i % 4) * 12,
                    "final_score": if i % 2 == 0 { 65 + i % 5 } else { 85 + i % 5 },
                }))
            })
            .collect()
    }

    #[test]
    fn test_comprehensive_text_only_below_candidate_threshold() {
        let request = ComprehensiveRequest {
            text: Some("Too emotional for leadership".to_string()),
            metadata: None,
            candidates: pool(5),
            protected_attributes: default_protected_attributes(),
        };
        let report = comprehensive(&request, &EngineConfig::default());
        assert!(report.text.is_some());
        assert!(report.demographic.is_empty());
        assert!(report.scores.is_empty());
        match &report.overall.evidence {
            Evidence::Aggregate(e) => assert_eq!(e.analyses_run, 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_comprehensive_runs_statistics_for_larger_lists() {
        let request: ComprehensiveRequest = serde_json::from_value(json!({
            "candidates": pool(40),
        }))
        .unwrap();
        assert_eq!(request.protected_attributes, vec!["gender".to_string()]);
        let report = comprehensive(&request, &EngineConfig::default());
        assert!(report.text.is_none());
        let demo = &report.demographic["gender"];
        // Final scores split cleanly by gender: every M is hired, no F is.
        assert!(demo.detected);
        assert_eq!(report.overall.bias_score, 1.0);
        assert!(report.scores["gender"].detected);
    }

    #[test]
    fn test_comprehensive_with_nothing_to_do() {
        let request: ComprehensiveRequest = serde_json::from_value(json!({})).unwrap();
        let report = comprehensive(&request, &EngineConfig::default());
        assert!(!report.overall.detected);
        assert_eq!(report.overall.recommendations, vec!["No analyses were run"]);
    }

    #[test]
    fn test_insights_small_list() {
        let i = insights(&pool(4), &EngineConfig::default());
        assert_eq!(i.message, "Insufficient data for statistical analysis");
        assert!(i.demographic_analysis.is_empty());
        assert!(i.score_analysis.is_none());
    }

    #[test]
    fn test_insights_covers_attributes_and_hiring_rate() {
        let i = insights(&pool(40), &EngineConfig::default());
        assert_eq!(
            i.demographic_analysis.keys().collect::<Vec<_>>(),
            vec!["age_group", "ethnicity", "gender"]
        );
        assert_eq!(i.overall_hiring_rate, 0.5);
        assert_eq!(i.risk_level, RiskLevel::High);
        assert!(i.recommendations[0].starts_with("High bias risk"));
    }

    #[test]
    fn test_insights_skips_age_group_without_ages() {
        let candidates: Vec<_> = (0..6)
            .map(|i| raw(json!({"gender": if i < 3 { "F" } else { "M" }, "hired": i % 2 == 0})))
            .collect();
        let i = insights(&candidates, &EngineConfig::default());
        assert!(!i.demographic_analysis.contains_key("age_group"));
        // ethnicity is absent too but still reported, with no confidence
        assert!(i.demographic_analysis.contains_key("ethnicity"));
        assert_eq!(i.overall_hiring_rate, 0.5);
    }
}
