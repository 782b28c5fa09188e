//! Demographic Parity Analyzer: hiring rates per group, the parity gap and its chi-square significance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bias::models::{AnalysisKind, BiasFinding, BiasLevel, Confidence, Evidence};
use crate::bias::normalizer::{normalize, NormalizeOptions, OutcomeProvenance, RawCandidate};
use crate::bias::numeric::{finite_or, ratio, snap, spread};
use crate::bias::stats::chi_square_independence;
use crate::bias::thresholds::{EngineConfig, ParityThresholds};

/// Minimum records (overall and participating) before rates are computed.
pub const MIN_RECORDS: usize = 3;
const MIN_GROUPS: usize = 2;
/// Gap above which a sourcing-specific recommendation is added.
const SOURCING_GAP: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParitySignificance {
    pub chi2_statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicEvidence {
    pub protected_attribute: String,
    pub hiring_rates_by_group: BTreeMap<String, f64>,
    pub group_counts: BTreeMap<String, usize>,
    pub overall_hiring_rate: f64,
    pub demographic_parity_difference: f64,
    pub bias_level: BiasLevel,
    pub statistical_significance: ParitySignificance,
    pub total_candidates: usize,
    pub excluded_missing_attribute: usize,
    pub excluded_missing_outcome: usize,
    pub outcome_provenance: OutcomeProvenance,
}

#[derive(Debug, Default)]
struct GroupTally {
    hired: usize,
    total: usize,
}

/// Classifies a hiring-rate gap: none < low ≤ … < medium ≤ … < high ≤.
pub fn classify_gap(gap: f64, thresholds: &ParityThresholds) -> BiasLevel {
    match gap {
        g if g >= thresholds.high => BiasLevel::High,
        g if g >= thresholds.medium => BiasLevel::Medium,
        g if g >= thresholds.low => BiasLevel::Low,
        _ => BiasLevel::None,
    }
}

/// Runs demographic-parity analysis of hiring outcomes against `attribute`.
pub fn analyze_demographic_bias(
    records: &[RawCandidate],
    attribute: &str,
    config: &EngineConfig,
) -> BiasFinding {
    if records.len() < MIN_RECORDS {
        return BiasFinding::insufficient_data(
            AnalysisKind::Demographic,
            records.len(),
            MIN_RECORDS,
            format!("Small dataset ({} candidates)", records.len()),
        );
    }

    let options = NormalizeOptions {
        allow_synthetic_outcomes: config.allow_synthetic_outcomes,
    };
    let batch = match normalize(records, attribute, options) {
        Ok(batch) => batch,
        Err(err) => return BiasFinding::unresolved(AnalysisKind::Demographic, err),
    };

    let mut tallies: BTreeMap<String, GroupTally> = BTreeMap::new();
    for (group, outcome) in batch.with_outcomes() {
        let tally = tallies.entry(group.to_string()).or_default();
        tally.total += 1;
        if outcome.is_hired() {
            tally.hired += 1;
        }
    }
    let participating: usize = tallies.values().map(|t| t.total).sum();
    let excluded_missing_outcome = batch.records.len() - participating;

    if participating < MIN_RECORDS || tallies.len() < MIN_GROUPS {
        debug!(
            attribute,
            participating,
            groups = tallies.len(),
            "Demographic parity skipped: not enough records or groups"
        );
        return BiasFinding::insufficient_data(
            AnalysisKind::Demographic,
            participating,
            MIN_RECORDS,
            format!(
                "{participating} candidates with an outcome across {} group(s); need at least {MIN_RECORDS} across {MIN_GROUPS}",
                tallies.len()
            ),
        );
    }

    let hiring_rates_by_group: BTreeMap<String, f64> = tallies
        .iter()
        .map(|(g, t)| (g.clone(), finite_or(ratio(t.hired as f64, t.total as f64), 0.0)))
        .collect();
    let group_counts: BTreeMap<String, usize> =
        tallies.iter().map(|(g, t)| (g.clone(), t.total)).collect();
    let total_hired: usize = tallies.values().map(|t| t.hired).sum();
    let overall_hiring_rate = ratio(total_hired as f64, participating as f64);

    let gap = snap(spread(hiring_rates_by_group.values().copied()));
    let bias_level = classify_gap(gap, &config.parity);
    let detected = bias_level != BiasLevel::None;
    let bias_score = (gap * 2.0).min(1.0);

    let table: Vec<Vec<f64>> = tallies
        .values()
        .map(|t| vec![t.hired as f64, (t.total - t.hired) as f64])
        .collect();
    let chi = chi_square_independence(&table);
    if chi.degenerate {
        debug!(attribute, "Contingency table degenerate; using neutral p-value");
    }
    let significance = ParitySignificance {
        chi2_statistic: chi.statistic,
        degrees_of_freedom: chi.degrees_of_freedom,
        p_value: chi.p_value,
        significant: chi.p_value < config.significance_alpha,
    };

    let mut confidence = Confidence::from_sample_size(participating);
    if batch.provenance.has_synthetic() {
        warn!(attribute, "Demographic finding built on synthetic outcomes");
        confidence = confidence.min(Confidence::Low);
    }

    let recommendations =
        parity_recommendations(bias_level, gap, batch.provenance.has_synthetic());

    debug!(
        attribute,
        gap,
        ?bias_level,
        p_value = significance.p_value,
        "Demographic parity analysis complete"
    );

    BiasFinding::new(
        AnalysisKind::Demographic,
        detected,
        bias_score,
        confidence,
        Evidence::Demographic(DemographicEvidence {
            protected_attribute: attribute.to_string(),
            hiring_rates_by_group,
            group_counts,
            overall_hiring_rate,
            demographic_parity_difference: gap,
            bias_level,
            statistical_significance: significance,
            total_candidates: participating,
            excluded_missing_attribute: batch.excluded_missing_attribute,
            excluded_missing_outcome,
            outcome_provenance: batch.provenance,
        }),
        recommendations,
    )
}

fn parity_recommendations(level: BiasLevel, gap: f64, synthetic: bool) -> Vec<String> {
    let tier: &[&str] = match level {
        BiasLevel::High => &[
            "Immediate review of hiring processes required",
            "Implement structured interview protocols",
            "Review job descriptions for biased language",
            "Train hiring managers on unconscious bias",
        ],
        BiasLevel::Medium => &[
            "Monitor hiring patterns closely",
            "Consider bias training for hiring team",
            "Review evaluation criteria for fairness",
        ],
        BiasLevel::Low => &[
            "Continue monitoring for bias patterns",
            "Document evaluation rationale clearly",
        ],
        BiasLevel::None => &[
            "Current hiring patterns show good demographic balance",
            "Continue current practices while monitoring",
            "Regular bias audits recommended",
        ],
    };

    let mut recommendations: Vec<String> = tier.iter().map(|s| s.to_string()).collect();
    if gap > SOURCING_GAP {
        recommendations.push(format!(
            "Significant hiring rate disparity: {:.1}% - Review sourcing strategies",
            gap * 100.0
        ));
    }
    if synthetic {
        recommendations.push(
            "Outcomes were synthesized for records without a hiring decision; record real decisions before acting on this result"
                .to_string(),
        );
    }
    recommendations
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
