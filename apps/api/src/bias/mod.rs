// Bias Detection Engine
// Implements: record normalization, demographic parity, score disparity, text lexicon
// matching, and worst-case aggregation. Every analysis is a synchronous pure function over
// borrowed input; handlers run them inside tokio::task::spawn_blocking.

pub mod aggregate;
pub mod demographic;
pub mod handlers;
pub mod lexicon;
pub mod models;
pub mod normalizer;
pub mod numeric;
pub mod report;
pub mod scores;
pub mod stats;
pub mod text;
pub mod thresholds;

pub use models::{AnalysisKind, BiasFinding, BiasLevel, Confidence, Evidence, RiskLevel};
pub use normalizer::{CandidateRecord, RawCandidate};
pub use report::{BiasInsights, BiasReport, ComprehensiveRequest};
pub use thresholds::EngineConfig;

/// Stateless service object. Holds only immutable tuning, so one instance is shared across
/// requests behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct BiasEngine {
    config: EngineConfig,
}

impl BiasEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze_demographic_bias(&self, records: &[RawCandidate], attribute: &str) -> BiasFinding {
        demographic::analyze_demographic_bias(records, attribute, &self.config)
    }

    pub fn analyze_score_bias(&self, records: &[RawCandidate], attribute: &str) -> BiasFinding {
        scores::analyze_score_bias(records, attribute, &self.config)
    }

    pub fn analyze_text(&self, text: &str, metadata: Option<&RawCandidate>) -> BiasFinding {
        text::analyze_text(text, metadata)
    }

    pub fn aggregate(&self, findings: &[BiasFinding]) -> BiasFinding {
        aggregate::aggregate(findings)
    }

    pub fn comprehensive(&self, request: &ComprehensiveRequest) -> BiasReport {
        report::comprehensive(request, &self.config)
    }

    pub fn insights(&self, candidates: &[RawCandidate]) -> BiasInsights {
        report::insights(candidates, &self.config)
    }
}
