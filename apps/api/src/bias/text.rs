//! Text Bias Pattern Detector: weighted, context-sensitive lexicon matching over evaluation notes.
//!
//! Each category phrase contributes `weight × context multiplier` at its first word-bounded
//! occurrence. Category score = min(1, Σ × 0.1); overall = min(1, Σ categories × 0.2).

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bias::lexicon::{
    TextBiasCategory, CLEAN_TEXT, CONTEXT_WINDOW, GENERAL_GUIDANCE, HIGH_RISK_HEADER,
    NEGATIVE_CONTEXT, NEGATIVE_CONTEXT_MULTIPLIER, OBJECTIVE_MARKERS, POSITIVE_CONTEXT,
    POSITIVE_CONTEXT_MULTIPLIER, RULES, SUBJECTIVE_MARKERS,
};
use crate::bias::models::{AnalysisKind, BiasFinding, Confidence, Evidence};
use crate::bias::normalizer::{extract_id, RawCandidate};

const CATEGORY_SCALE: f64 = 0.1;
const OVERALL_SCALE: f64 = 0.2;
const DETECTION_THRESHOLD: f64 = 0.3;
const CATEGORY_DETECTION_THRESHOLD: f64 = 0.5;
const MAX_CATEGORIES_BEFORE_DETECTION: usize = 2;
const HIGH_RISK_THRESHOLD: f64 = 0.6;
const OBJECTIVE_SATURATION: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPatternMatch {
    pub category: TextBiasCategory,
    pub phrase: String,
    pub weight: f64,
    pub context_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEvidence {
    pub detected_patterns: BTreeMap<TextBiasCategory, Vec<String>>,
    pub category_scores: BTreeMap<TextBiasCategory, f64>,
    pub matches: Vec<TextPatternMatch>,
    pub total_bias_indicators: usize,
    pub subjective_markers: Vec<String>,
    /// Share of objective wording, informational only.
    pub objective_language_score: f64,
    pub text_length: usize,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
}

/// Scans `text` for biased phrasing. `metadata` only contributes the candidate id.
pub fn analyze_text(text: &str, metadata: Option<&RawCandidate>) -> BiasFinding {
    let lowered = text.to_lowercase();
    let word_count = lowered.split_whitespace().count();
    let candidate_id = metadata.and_then(extract_id);

    let mut matches = Vec::new();
    for rule in RULES {
        for &(phrase, weight) in rule.phrases {
            if let Some(at) = find_bounded(&lowered, phrase) {
                matches.push(TextPatternMatch {
                    category: rule.category,
                    phrase: phrase.to_string(),
                    weight,
                    context_multiplier: context_multiplier(&lowered, at, phrase.len()),
                });
            }
        }
    }

    let mut detected_patterns: BTreeMap<TextBiasCategory, Vec<String>> = BTreeMap::new();
    let mut raw_scores: BTreeMap<TextBiasCategory, f64> = BTreeMap::new();
    for m in &matches {
        detected_patterns
            .entry(m.category)
            .or_default()
            .push(m.phrase.clone());
        *raw_scores.entry(m.category).or_default() += m.weight * m.context_multiplier;
    }
    let category_scores: BTreeMap<TextBiasCategory, f64> = raw_scores
        .into_iter()
        .map(|(c, sum)| (c, (sum * CATEGORY_SCALE).min(1.0)))
        .collect();

    let overall = (category_scores.values().sum::<f64>() * OVERALL_SCALE).min(1.0);
    let detected = overall > DETECTION_THRESHOLD
        || category_scores.len() > MAX_CATEGORIES_BEFORE_DETECTION
        || category_scores
            .values()
            .any(|s| *s > CATEGORY_DETECTION_THRESHOLD);

    let subjective_markers: Vec<String> = SUBJECTIVE_MARKERS
        .iter()
        .filter(|m| find_bounded(&lowered, m).is_some())
        .map(|m| m.to_string())
        .collect();
    let objective_hits: usize = OBJECTIVE_MARKERS
        .iter()
        .map(|m| count_bounded(&lowered, m))
        .sum();
    let objective_language_score = (objective_hits as f64 / OBJECTIVE_SATURATION).min(1.0);

    let confidence = if text.trim().is_empty() {
        Confidence::None
    } else {
        text_confidence(word_count)
    };

    let recommendations = if text.trim().is_empty() {
        vec!["Provide evaluation text to enable language analysis".to_string()]
    } else {
        text_recommendations(&category_scores, overall)
    };

    debug!(
        word_count,
        matches = matches.len(),
        categories = category_scores.len(),
        overall,
        "Text bias analysis complete"
    );

    BiasFinding::new(
        AnalysisKind::Text,
        detected,
        overall,
        confidence,
        Evidence::Text(TextEvidence {
            total_bias_indicators: matches.len(),
            detected_patterns,
            category_scores,
            matches,
            subjective_markers,
            objective_language_score,
            text_length: text.chars().count(),
            word_count,
            candidate_id,
        }),
        recommendations,
    )
}

fn text_confidence(word_count: usize) -> Confidence {
    match word_count {
        n if n >= 50 => Confidence::High,
        n if n >= 15 => Confidence::Medium,
        _ => Confidence::Low,
    }
}

fn text_recommendations(category_scores: &BTreeMap<TextBiasCategory, f64>, overall: f64) -> Vec<String> {
    let mut out = Vec::new();
    if overall > HIGH_RISK_THRESHOLD {
        out.push(HIGH_RISK_HEADER.to_string());
    }
    for rule in RULES {
        if category_scores.contains_key(&rule.category) {
            out.push(rule.recommendation.to_string());
        }
    }
    if category_scores.is_empty() {
        out.push(CLEAN_TEXT.to_string());
    }
    out.extend(GENERAL_GUIDANCE.iter().map(|s| s.to_string()));

    let mut seen = HashSet::new();
    out.retain(|r| seen.insert(r.clone()));
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Matching
// ────────────────────────────────────────────────────────────────────────────

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(char::is_alphanumeric)
}

fn is_bounded(haystack: &str, at: usize, len: usize) -> bool {
    let before = haystack[..at].chars().next_back();
    let after = haystack[at + len..].chars().next();
    !is_word_char(before) && !is_word_char(after)
}

/// Byte offset of the first occurrence of `phrase` not embedded in a longer word.
fn find_bounded(haystack: &str, phrase: &str) -> Option<usize> {
    haystack
        .match_indices(phrase)
        .map(|(at, _)| at)
        .find(|&at| is_bounded(haystack, at, phrase.len()))
}

fn count_bounded(haystack: &str, phrase: &str) -> usize {
    haystack
        .match_indices(phrase)
        .filter(|(at, _)| is_bounded(haystack, *at, phrase.len()))
        .count()
}

/// Negative context around a match amplifies it, positive context dampens it.
fn context_multiplier(haystack: &str, at: usize, len: usize) -> f64 {
    // Window of CONTEXT_WINDOW characters either side, not bytes.
    let start = haystack[..at]
        .char_indices()
        .rev()
        .nth(CONTEXT_WINDOW - 1)
        .map_or(0, |(i, _)| i);
    let after = at + len;
    let end = haystack[after..]
        .char_indices()
        .nth(CONTEXT_WINDOW)
        .map_or(haystack.len(), |(i, _)| after + i);
    let window = &haystack[start..end];

    if NEGATIVE_CONTEXT.iter().any(|p| window.contains(p)) {
        NEGATIVE_CONTEXT_MULTIPLIER
    } else if POSITIVE_CONTEXT.iter().any(|p| window.contains(p)) {
        POSITIVE_CONTEXT_MULTIPLIER
    } else {
        1.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
