//! Candidate Record Normalizer: coerces heterogeneous candidate maps into `CandidateRecord`.
//!
//! Field names are resolved through fixed, ordered alias tables (`gender` ↔ `sex`, score
//! aliases, ...). Hiring outcomes are inferred per record in priority order:
//! explicit decision → `hired` flag → `status` → `final_score` proxy → synthetic placeholder
//! (opt-in only). Pure transform; never panics.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// A dict-like candidate record with arbitrary or missing keys.
pub type RawCandidate = Map<String, Value>;

// ────────────────────────────────────────────────────────────────────────────
// Alias tables
// ────────────────────────────────────────────────────────────────────────────

/// Protected attribute → alternate column names, tried in order after the canonical name.
pub const ATTRIBUTE_ALIASES: &[(&str, &[&str])] = &[
    ("gender", &["sex", "Gender", "Sex"]),
    ("ethnicity", &["race", "Ethnicity", "Race", "ethnic_group"]),
    ("age", &["Age", "age_group"]),
    ("age_group", &["ageGroup", "age_bracket"]),
];

const ID_KEYS: &[&str] = &["id", "candidate_id"];
const DECISION_KEYS: &[&str] = &["hiring_decision", "decision", "outcome"];
const HIRED_FLAG_KEY: &str = "hired";
const STATUS_KEY: &str = "status";
const AGE_KEYS: &[&str] = &["age", "Age"];

/// `(upper bound inclusive, label)`; lower bound of the first bracket is exclusive 0.
const AGE_BRACKETS: &[(f64, &str)] = &[
    (30.0, "Under 30"),
    (45.0, "30-45"),
    (65.0, "45-65"),
    (100.0, "Over 65"),
];

/// Final-score proxy cut-offs: ≥ 80 hired, ≥ 70 pending, otherwise rejected.
pub const HIRE_SCORE_THRESHOLD: f64 = 80.0;
pub const HOLD_SCORE_THRESHOLD: f64 = 70.0;

pub fn attribute_aliases(attribute: &str) -> &'static [&'static str] {
    ATTRIBUTE_ALIASES
        .iter()
        .find(|(name, _)| *name == attribute)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    Resume,
    Interview,
    Technical,
    Final,
}

impl ScoreField {
    pub const ALL: [ScoreField; 4] = [
        ScoreField::Resume,
        ScoreField::Interview,
        ScoreField::Technical,
        ScoreField::Final,
    ];

    pub fn canonical_name(self) -> &'static str {
        match self {
            ScoreField::Resume => "resume_score",
            ScoreField::Interview => "interview_score",
            ScoreField::Technical => "technical_score",
            ScoreField::Final => "final_score",
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            ScoreField::Resume => &["resume", "cv_score", "application_score"],
            ScoreField::Interview => &["interview", "behavioral_score"],
            ScoreField::Technical => &["technical", "coding_score", "skill_score"],
            ScoreField::Final => &["final", "total_score", "overall_score", "score"],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field resolution
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// None of the candidate keys exist.
    Absent,
    /// A key exists but holds null or an empty string.
    Empty,
}

/// Outcome of looking a field up under its canonical name and aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldResolution<'k> {
    Resolved(&'k str),
    Unresolved(UnresolvedReason),
}

/// Finds the first key (canonical name first, then aliases in order) holding a usable value.
pub fn resolve_field<'k>(
    record: &RawCandidate,
    canonical: &'k str,
    aliases: &[&'k str],
) -> FieldResolution<'k> {
    let mut reason = UnresolvedReason::Absent;
    for key in std::iter::once(canonical).chain(aliases.iter().copied()) {
        match record.get(key) {
            Some(value) if is_present(value) => return FieldResolution::Resolved(key),
            Some(_) => reason = UnresolvedReason::Empty,
            None => {}
        }
    }
    FieldResolution::Unresolved(reason)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn lookup<'a>(record: &'a RawCandidate, canonical: &str, aliases: &[&str]) -> Option<&'a Value> {
    match resolve_field(record, canonical, aliases) {
        FieldResolution::Resolved(key) => record.get(key),
        FieldResolution::Unresolved(_) => None,
    }
}

/// Group label from a string, number or boolean.
pub fn value_as_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Finite number from a JSON number or a numeric string.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Derived age bracket for a numeric age; `None` outside (0, 100].
pub fn age_bracket(age: f64) -> Option<&'static str> {
    if !age.is_finite() || age <= 0.0 {
        return None;
    }
    AGE_BRACKETS
        .iter()
        .find(|(upper, _)| age <= *upper)
        .map(|(_, label)| *label)
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical record
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiringOutcome {
    Hired,
    Rejected,
    Pending,
}

impl HiringOutcome {
    /// Maps free-form decision/status strings. Unknown non-empty strings are pending.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return None;
        }
        let outcome = match label.as_str() {
            "hired" | "hire" | "offer" | "offered" | "accepted" | "offer_accepted"
            | "selected" => HiringOutcome::Hired,
            "rejected" | "reject" | "declined" | "not_hired" | "not hired" | "no_hire"
            | "withdrawn" => HiringOutcome::Rejected,
            _ => HiringOutcome::Pending,
        };
        Some(outcome)
    }

    pub fn from_final_score(score: f64) -> Self {
        if score >= HIRE_SCORE_THRESHOLD {
            HiringOutcome::Hired
        } else if score >= HOLD_SCORE_THRESHOLD {
            HiringOutcome::Pending
        } else {
            HiringOutcome::Rejected
        }
    }

    pub fn is_hired(self) -> bool {
        self == HiringOutcome::Hired
    }
}

/// Canonical candidate. Serialises back to a raw map that normalises to itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Protected attribute values keyed by canonical attribute name.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hiring_decision: Option<HiringOutcome>,
}

impl CandidateRecord {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn score(&self, field: ScoreField) -> Option<f64> {
        match field {
            ScoreField::Resume => self.resume_score,
            ScoreField::Interview => self.interview_score,
            ScoreField::Technical => self.technical_score,
            ScoreField::Final => self.final_score,
        }
    }

    fn set_score(&mut self, field: ScoreField, value: Option<f64>) {
        let slot = match field {
            ScoreField::Resume => &mut self.resume_score,
            ScoreField::Interview => &mut self.interview_score,
            ScoreField::Technical => &mut self.technical_score,
            ScoreField::Final => &mut self.final_score,
        };
        *slot = value;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outcome provenance
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    Explicit,
    HiredFlag,
    Status,
    ScoreProxy,
    Synthetic,
    Missing,
}

/// How many outcomes came from each inference step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeProvenance {
    pub explicit: usize,
    pub hired_flag: usize,
    pub status: usize,
    pub score_proxy: usize,
    pub synthetic: usize,
    pub missing: usize,
}

impl OutcomeProvenance {
    fn record(&mut self, source: OutcomeSource) {
        let slot = match source {
            OutcomeSource::Explicit => &mut self.explicit,
            OutcomeSource::HiredFlag => &mut self.hired_flag,
            OutcomeSource::Status => &mut self.status,
            OutcomeSource::ScoreProxy => &mut self.score_proxy,
            OutcomeSource::Synthetic => &mut self.synthetic,
            OutcomeSource::Missing => &mut self.missing,
        };
        *slot += 1;
    }

    pub fn has_synthetic(&self) -> bool {
        self.synthetic > 0
    }
}

fn hired_flag(value: &Value) -> Option<HiringOutcome> {
    let hired = match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64()? != 0.0,
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => true,
            "false" | "no" | "n" | "0" => false,
            _ => return None,
        },
        _ => return None,
    };
    Some(if hired {
        HiringOutcome::Hired
    } else {
        HiringOutcome::Rejected
    })
}

/// Infers a record's outcome without synthetic fallback.
pub fn infer_outcome(record: &RawCandidate) -> (Option<HiringOutcome>, OutcomeSource) {
    let from_label = |v: &Value| v.as_str().and_then(HiringOutcome::from_label);

    if let Some(outcome) = lookup(record, DECISION_KEYS[0], &DECISION_KEYS[1..]).and_then(from_label)
    {
        return (Some(outcome), OutcomeSource::Explicit);
    }
    if let Some(outcome) = record.get(HIRED_FLAG_KEY).and_then(hired_flag) {
        return (Some(outcome), OutcomeSource::HiredFlag);
    }
    if let Some(outcome) = record.get(STATUS_KEY).and_then(from_label) {
        return (Some(outcome), OutcomeSource::Status);
    }
    let final_field = ScoreField::Final;
    if let Some(score) = lookup(record, final_field.canonical_name(), final_field.aliases())
        .and_then(value_as_f64)
    {
        return (
            Some(HiringOutcome::from_final_score(score)),
            OutcomeSource::ScoreProxy,
        );
    }
    (None, OutcomeSource::Missing)
}

// ────────────────────────────────────────────────────────────────────────────
// Batch normalization
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub allow_synthetic_outcomes: bool,
}

/// The requested attribute could not be resolved on any record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required column: {requested} (also tried: {})", .tried.join(", "))]
pub struct UnresolvedField {
    pub requested: String,
    pub tried: Vec<String>,
    pub available_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch {
    pub attribute: String,
    pub records: Vec<CandidateRecord>,
    pub total_input: usize,
    pub excluded_missing_attribute: usize,
    pub provenance: OutcomeProvenance,
}

impl NormalizedBatch {
    pub fn with_outcomes(&self) -> impl Iterator<Item = (&str, HiringOutcome)> + '_ {
        self.records.iter().filter_map(move |r| {
            let group = r.attribute(&self.attribute)?;
            r.hiring_decision.map(|o| (group, o))
        })
    }
}

/// Sorted union of keys across all records.
pub fn available_columns(records: &[RawCandidate]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| r.keys().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

fn resolve_attribute(record: &RawCandidate, attribute: &str) -> Result<String, UnresolvedReason> {
    let resolution = resolve_field(record, attribute, attribute_aliases(attribute));
    match resolution {
        FieldResolution::Resolved(key) => record
            .get(key)
            .and_then(value_as_label)
            .ok_or(UnresolvedReason::Empty),
        FieldResolution::Unresolved(reason) if attribute == "age_group" => AGE_KEYS
            .iter()
            .filter_map(|k| record.get(*k).and_then(value_as_f64))
            .find_map(age_bracket)
            .map(str::to_string)
            .ok_or(reason),
        FieldResolution::Unresolved(reason) => Err(reason),
    }
}

pub fn extract_id(record: &RawCandidate) -> Option<String> {
    lookup(record, ID_KEYS[0], &ID_KEYS[1..]).and_then(value_as_label)
}

/// Normalizes `raw` against one protected attribute.
///
/// Records without the attribute are excluded and counted. Returns `UnresolvedField` only when
/// no record at all carries it.
pub fn normalize(
    raw: &[RawCandidate],
    attribute: &str,
    options: NormalizeOptions,
) -> Result<NormalizedBatch, UnresolvedField> {
    let mut records = Vec::with_capacity(raw.len());
    let mut provenance = OutcomeProvenance::default();
    let mut excluded_missing_attribute = 0usize;
    let mut synthetic_index = 0usize;

    for candidate in raw {
        let group = match resolve_attribute(candidate, attribute) {
            Ok(group) => group,
            Err(reason) => {
                debug!(attribute, ?reason, "Excluding record without protected attribute");
                excluded_missing_attribute += 1;
                continue;
            }
        };

        let (mut outcome, mut source) = infer_outcome(candidate);
        if outcome.is_none() && options.allow_synthetic_outcomes {
            outcome = Some(if synthetic_index % 2 == 0 {
                HiringOutcome::Hired
            } else {
                HiringOutcome::Rejected
            });
            source = OutcomeSource::Synthetic;
            synthetic_index += 1;
        }
        provenance.record(source);

        let mut record = CandidateRecord {
            id: extract_id(candidate),
            attributes: BTreeMap::from([(attribute.to_string(), group)]),
            resume_score: None,
            interview_score: None,
            technical_score: None,
            final_score: None,
            hiring_decision: outcome,
        };
        for field in ScoreField::ALL {
            let score = lookup(candidate, field.canonical_name(), field.aliases())
                .and_then(value_as_f64);
            record.set_score(field, score);
        }
        records.push(record);
    }

    if records.is_empty() && !raw.is_empty() {
        return Err(UnresolvedField {
            requested: attribute.to_string(),
            tried: attribute_aliases(attribute)
                .iter()
                .map(|s| s.to_string())
                .collect(),
            available_columns: available_columns(raw),
        });
    }

    if provenance.has_synthetic() {
        warn!(
            attribute,
            synthetic = provenance.synthetic,
            "Synthetic hiring outcomes assigned; results are placeholders"
        );
    }

    Ok(NormalizedBatch {
        attribute: attribute.to_string(),
        records,
        total_input: raw.len(),
        excluded_missing_attribute,
        provenance,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCandidate {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_resolve_field_prefers_canonical_then_alias_order() {
        let r = raw(json!({"sex": "F", "Gender": "M"}));
        assert_eq!(
            resolve_field(&r, "gender", attribute_aliases("gender")),
            FieldResolution::Resolved("sex")
        );
        let r = raw(json!({"gender": "F", "sex": "M"}));
        assert_eq!(
            resolve_field(&r, "gender", attribute_aliases("gender")),
            FieldResolution::Resolved("gender")
        );
    }

    #[test]
    fn test_resolve_field_reports_reason() {
        let r = raw(json!({"gender": null}));
        assert_eq!(
            resolve_field(&r, "gender", &[]),
            FieldResolution::Unresolved(UnresolvedReason::Empty)
        );
        assert_eq!(
            resolve_field(&raw(json!({})), "gender", &[]),
            FieldResolution::Unresolved(UnresolvedReason::Absent)
        );
    }

    #[test]
    fn test_alias_attribute_is_canonicalized() {
        let batch = normalize(
            &[raw(json!({"id": 7, "sex": "female", "hired": true}))],
            "gender",
            NormalizeOptions::default(),
        )
        .unwrap();
        let rec = &batch.records[0];
        assert_eq!(rec.attribute("gender"), Some("female"));
        assert_eq!(rec.id.as_deref(), Some("7"));
        assert_eq!(rec.hiring_decision, Some(HiringOutcome::Hired));
        assert_eq!(batch.provenance.hired_flag, 1);
    }

    #[test]
    fn test_missing_attribute_records_are_excluded_and_counted() {
        let batch = normalize(
            &[
                raw(json!({"gender": "M", "hiring_decision": "hired"})),
                raw(json!({"hiring_decision": "rejected"})),
                raw(json!({"gender": "", "hiring_decision": "rejected"})),
            ],
            "gender",
            NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.excluded_missing_attribute, 2);
        assert_eq!(batch.total_input, 3);
    }

    #[test]
    fn test_unresolvable_attribute_lists_available_columns() {
        let err = normalize(
            &[raw(json!({"id": 1, "final_score": 90}))],
            "ethnicity",
            NormalizeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.requested, "ethnicity");
        assert_eq!(err.available_columns, vec!["final_score", "id"]);
        assert!(err.tried.contains(&"race".to_string()));
        assert!(err.to_string().contains("ethnicity"));
    }

    #[test]
    fn test_outcome_priority_order() {
        let explicit = raw(json!({"hiring_decision": "rejected", "hired": true, "final_score": 95}));
        assert_eq!(
            infer_outcome(&explicit),
            (Some(HiringOutcome::Rejected), OutcomeSource::Explicit)
        );

        let flag = raw(json!({"hired": false, "status": "hired"}));
        assert_eq!(
            infer_outcome(&flag),
            (Some(HiringOutcome::Rejected), OutcomeSource::HiredFlag)
        );

        let status = raw(json!({"status": "interviewing", "final_score": 95}));
        assert_eq!(
            infer_outcome(&status),
            (Some(HiringOutcome::Pending), OutcomeSource::Status)
        );

        let proxy = raw(json!({"total_score": "85"}));
        assert_eq!(
            infer_outcome(&proxy),
            (Some(HiringOutcome::Hired), OutcomeSource::ScoreProxy)
        );

        assert_eq!(infer_outcome(&raw(json!({}))), (None, OutcomeSource::Missing));
    }

    #[test]
    fn test_final_score_proxy_bands() {
        assert_eq!(HiringOutcome::from_final_score(80.0), HiringOutcome::Hired);
        assert_eq!(HiringOutcome::from_final_score(79.9), HiringOutcome::Pending);
        assert_eq!(HiringOutcome::from_final_score(70.0), HiringOutcome::Pending);
        assert_eq!(HiringOutcome::from_final_score(69.9), HiringOutcome::Rejected);
    }

    #[test]
    fn test_synthetic_outcomes_only_when_enabled() {
        let input = vec![
            raw(json!({"gender": "M"})),
            raw(json!({"gender": "F"})),
            raw(json!({"gender": "F"})),
        ];

        let off = normalize(&input, "gender", NormalizeOptions::default()).unwrap();
        assert!(off.records.iter().all(|r| r.hiring_decision.is_none()));
        assert_eq!(off.provenance.missing, 3);
        assert!(!off.provenance.has_synthetic());

        let on = normalize(
            &input,
            "gender",
            NormalizeOptions {
                allow_synthetic_outcomes: true,
            },
        )
        .unwrap();
        let outcomes: Vec<_> = on.records.iter().map(|r| r.hiring_decision).collect();
        assert_eq!(
            outcomes,
            vec![
                Some(HiringOutcome::Hired),
                Some(HiringOutcome::Rejected),
                Some(HiringOutcome::Hired)
            ]
        );
        assert_eq!(on.provenance.synthetic, 3);
    }

    #[test]
    fn test_score_aliases_and_numeric_strings() {
        let batch = normalize(
            &[raw(json!({
                "gender": "F",
                "cv_score": "72.5",
                "coding_score": 88,
                "interview": "n/a",
                "overall_score": 91
            }))],
            "gender",
            NormalizeOptions::default(),
        )
        .unwrap();
        let r = &batch.records[0];
        assert_eq!(r.resume_score, Some(72.5));
        assert_eq!(r.technical_score, Some(88.0));
        assert_eq!(r.interview_score, None);
        assert_eq!(r.final_score, Some(91.0));
        assert_eq!(r.hiring_decision, Some(HiringOutcome::Hired));
    }

    #[test]
    fn test_age_group_derived_from_age() {
        let batch = normalize(
            &[
                raw(json!({"age": 29})),
                raw(json!({"age": 30})),
                raw(json!({"age": "44"})),
                raw(json!({"Age": 70})),
                raw(json!({"age": 0})),
                raw(json!({"age": 130})),
            ],
            "age_group",
            NormalizeOptions::default(),
        )
        .unwrap();
        let groups: Vec<_> = batch
            .records
            .iter()
            .map(|r| r.attribute("age_group").unwrap().to_string())
            .collect();
        assert_eq!(groups, vec!["Under 30", "Under 30", "30-45", "Over 65"]);
        assert_eq!(batch.excluded_missing_attribute, 2);
    }

    #[test]
    fn test_canonical_record_round_trip_is_noop() {
        let canonical = CandidateRecord {
            id: Some("c-42".to_string()),
            attributes: BTreeMap::from([("gender".to_string(), "female".to_string())]),
            resume_score: Some(81.0),
            interview_score: None,
            technical_score: Some(66.5),
            final_score: Some(74.0),
            hiring_decision: Some(HiringOutcome::Rejected),
        };
        let as_raw = raw(serde_json::to_value(&canonical).unwrap());

        let batch = normalize(&[as_raw], "gender", NormalizeOptions::default()).unwrap();
        assert_eq!(batch.records, vec![canonical]);
        assert_eq!(batch.provenance.explicit, 1);
    }

    #[test]
    fn test_empty_input_is_ok_and_empty() {
        let batch = normalize(&[], "gender", NormalizeOptions::default()).unwrap();
        assert!(batch.records.is_empty());
        assert_eq!(batch.total_input, 0);
    }

    #[test]
    fn test_non_finite_and_non_numeric_scores_are_absent() {
        assert_eq!(value_as_f64(&json!("NaN")), None);
        assert_eq!(value_as_f64(&json!("inf")), None);
        assert_eq!(value_as_f64(&json!(true)), None);
        assert_eq!(value_as_f64(&json!(" 12 ")), Some(12.0));
    }
}
