//! Score Disparity Analyzer: per-field group means compared with a t-test or one-way ANOVA.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bias::models::{AnalysisKind, BiasFinding, Confidence, Evidence};
use crate::bias::normalizer::{
    available_columns, normalize, CandidateRecord, NormalizeOptions, RawCandidate, ScoreField,
};
use crate::bias::numeric::{finite_or, mean, ratio, sample_std, spread};
use crate::bias::stats::{one_way_anova, two_sample_t_test, SignificanceTest};
use crate::bias::thresholds::{EngineConfig, ScoreThresholds};

pub const MIN_RECORDS: usize = 3;
/// Substituted when a significance test cannot be computed.
const NEUTRAL_P_VALUE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupScoreStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDisparity {
    pub bias_detected: bool,
    pub groups: BTreeMap<String, GroupScoreStats>,
    pub score_disparity: f64,
    pub relative_disparity: f64,
    /// `None` when the test was degenerate and the neutral p-value was used.
    pub test: Option<SignificanceTest>,
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub bias_score: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldAnalysis {
    InsufficientData { sample_size: usize },
    SingleGroup {
        group: String,
        mean_score: f64,
        sample_size: usize,
    },
    Analyzed(FieldDisparity),
}

impl FieldAnalysis {
    fn disparity(&self) -> Option<&FieldDisparity> {
        match self {
            FieldAnalysis::Analyzed(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvidence {
    pub protected_attribute: String,
    /// Keyed by canonical score field name.
    pub fields: BTreeMap<String, FieldAnalysis>,
    pub available_score_types: Vec<String>,
    pub total_candidates_analyzed: usize,
    pub excluded_missing_attribute: usize,
}

/// Runs score-disparity analysis across every score field present in `records`.
pub fn analyze_score_bias(
    records: &[RawCandidate],
    attribute: &str,
    config: &EngineConfig,
) -> BiasFinding {
    if records.len() < MIN_RECORDS {
        return BiasFinding::insufficient_data(
            AnalysisKind::Score,
            records.len(),
            MIN_RECORDS,
            format!("Small dataset ({} candidates)", records.len()),
        );
    }

    // Outcomes are irrelevant here; never synthesize them.
    let batch = match normalize(records, attribute, NormalizeOptions::default()) {
        Ok(batch) => batch,
        Err(err) => return BiasFinding::unresolved(AnalysisKind::Score, err),
    };

    let present: Vec<ScoreField> = ScoreField::ALL
        .into_iter()
        .filter(|f| batch.records.iter().any(|r| r.score(*f).is_some()))
        .collect();

    if present.is_empty() {
        let requested = ScoreField::ALL
            .iter()
            .map(|f| f.canonical_name().to_string())
            .collect();
        return BiasFinding::missing_field(
            AnalysisKind::Score,
            requested,
            available_columns(records),
            "No score fields found in candidate data",
        );
    }

    let mut fields = BTreeMap::new();
    for field in &present {
        let analysis = analyze_field(&batch.records, attribute, *field, config);
        fields.insert(field.canonical_name().to_string(), analysis);
    }

    let flagged: Vec<&str> = fields
        .iter()
        .filter(|(_, a)| a.disparity().is_some_and(|d| d.bias_detected))
        .map(|(name, _)| name.as_str())
        .collect();
    let detected = !flagged.is_empty();
    let bias_score = fields
        .values()
        .filter_map(FieldAnalysis::disparity)
        .map(|d| d.bias_score)
        .fold(0.0, f64::max);

    let recommendations = score_recommendations(detected, &flagged);
    let total = batch.records.len();

    debug!(
        attribute,
        fields = present.len(),
        flagged = flagged.len(),
        bias_score,
        "Score disparity analysis complete"
    );

    BiasFinding::new(
        AnalysisKind::Score,
        detected,
        bias_score,
        Confidence::from_sample_size(total),
        Evidence::Score(ScoreEvidence {
            protected_attribute: attribute.to_string(),
            fields,
            available_score_types: present
                .iter()
                .map(|f| f.canonical_name().to_string())
                .collect(),
            total_candidates_analyzed: total,
            excluded_missing_attribute: batch.excluded_missing_attribute,
        }),
        recommendations,
    )
}

fn analyze_field(
    records: &[CandidateRecord],
    attribute: &str,
    field: ScoreField,
    config: &EngineConfig,
) -> FieldAnalysis {
    let mut by_group: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in records {
        if let (Some(group), Some(score)) = (r.attribute(attribute), r.score(field)) {
            by_group.entry(group.to_string()).or_default().push(score);
        }
    }
    let sample_size: usize = by_group.values().map(Vec::len).sum();

    if sample_size < MIN_RECORDS {
        return FieldAnalysis::InsufficientData { sample_size };
    }
    if by_group.len() < 2 {
        let (group, scores) = by_group.into_iter().next().unwrap_or_default();
        return FieldAnalysis::SingleGroup {
            group,
            mean_score: mean(&scores),
            sample_size,
        };
    }

    let groups: BTreeMap<String, GroupScoreStats> = by_group
        .iter()
        .map(|(g, scores)| {
            (
                g.clone(),
                GroupScoreStats {
                    count: scores.len(),
                    mean: mean(scores),
                    std: sample_std(scores),
                },
            )
        })
        .collect();

    let score_disparity = spread(groups.values().map(|s| s.mean));
    let range = spread(by_group.values().flatten().copied());
    let relative_disparity = if range > 0.0 {
        ratio(score_disparity, range.max(1.0))
    } else {
        0.0
    };

    let samples: Vec<Vec<f64>> = by_group.into_values().collect();
    let outcome = if samples.len() == 2 {
        two_sample_t_test(&samples[0], &samples[1])
    } else {
        one_way_anova(&samples)
    };
    let (test, statistic, p_value) = match outcome {
        Some(o) => (Some(o.test), o.statistic, o.p_value),
        None => {
            debug!(field = field.canonical_name(), "Degenerate score test; neutral p-value");
            (None, 0.0, NEUTRAL_P_VALUE)
        }
    };
    let significant = p_value < config.significance_alpha;

    FieldAnalysis::Analyzed(FieldDisparity {
        bias_detected: is_flagged(score_disparity, relative_disparity, significant, &config.score),
        groups,
        score_disparity,
        relative_disparity,
        test,
        statistic: finite_or(statistic, 0.0),
        p_value,
        significant,
        bias_score: (relative_disparity * 2.0).min(1.0),
        sample_size,
    })
}

fn is_flagged(disparity: f64, relative: f64, significant: bool, t: &ScoreThresholds) -> bool {
    disparity > t.absolute_disparity
        || relative > t.relative_disparity
        || (significant && disparity > t.significant_disparity)
}

fn score_recommendations(detected: bool, flagged: &[&str]) -> Vec<String> {
    let base: &[&str] = if detected {
        &[
            "Review scoring rubrics for potential bias",
            "Implement blind scoring where possible",
            "Train evaluators on bias recognition",
            "Consider multiple evaluators per candidate",
            "Standardize evaluation criteria",
        ]
    } else {
        &[
            "Current scoring patterns appear fair",
            "Continue monitoring score distributions",
            "Maintain consistent evaluation standards",
        ]
    };

    base.iter()
        .map(|s| s.to_string())
        .chain(flagged.iter().map(|field| {
            format!("Score bias detected in {field} - review evaluation criteria")
        }))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
