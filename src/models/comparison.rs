use crate::models::issue::{LegalCategory, RiskLevel};
use crate::models::report::AnalysisReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub individual_results: BTreeMap<String, ModelResult>,
    pub comparison_metrics: ComparisonMetrics,
}

/// A model's slot in a comparison: its report, or the error that stopped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelResult {
    Report(Box<AnalysisReport>),
    Error { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub models_compared: usize,
    pub accuracy_scores: BTreeMap<String, f64>,
    pub consensus_issues: Vec<ConsensusIssue>,
    pub performance_comparison: BTreeMap<String, PerformanceSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusIssue {
    pub category: LegalCategory,
    pub risk_level: RiskLevel,
    pub count: usize,
    pub models: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub response_time: f64,
    pub tokens_used: u64,
    pub issues_found: usize,
    pub confidence_avg: f64,
}

impl ModelResult {
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            ModelResult::Report(report) => Some(&**report),
            ModelResult::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ModelResult::Report(_) => None,
            ModelResult::Error { error } => Some(error),
        }
    }
}

impl ComparisonReport {
    pub fn successful_models(&self) -> impl Iterator<Item = (&String, &AnalysisReport)> {
        self.individual_results
            .iter()
            .filter_map(|(model, result)| result.report().map(|report| (model, report)))
    }

    pub fn failed_models(&self) -> impl Iterator<Item = (&String, &str)> {
        self.individual_results
            .iter()
            .filter_map(|(model, result)| result.error().map(|error| (model, error)))
    }

    /// Highest accuracy score among models that produced a live analysis;
    /// ties go to the lexically first model id.
    pub fn best_model(&self) -> Option<(&String, f64)> {
        self.comparison_metrics
            .accuracy_scores
            .iter()
            .filter(|(model, _)| {
                self.individual_results
                    .get(*model)
                    .and_then(ModelResult::report)
                    .is_some_and(|report| !report.is_fallback())
            })
            .fold(None, |best: Option<(&String, f64)>, (model, score)| match best {
                Some((_, best_score)) if best_score >= *score => best,
                _ => Some((model, *score)),
            })
    }
}
