use crate::analyzer::orchestrator::AnalysisOrchestrator;
use crate::models::{
    AnalysisReport, AnalysisRequest, ComparisonMetrics, ComparisonReport, ConsensusIssue,
    ModelResult, PerformanceSummary,
};
use futures::future::join_all;
use std::collections::BTreeMap;

/// Runs the same document through several models and scores the results
/// against each other.
pub struct ModelComparator {
    orchestrator: AnalysisOrchestrator,
    max_concurrent: usize,
}

impl ModelComparator {
    pub fn new(orchestrator: AnalysisOrchestrator) -> Self {
        Self {
            orchestrator,
            max_concurrent: 1,
        }
    }

    /// Models analyzed at once. 1 (the default) runs them one after another.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn orchestrator(&self) -> &AnalysisOrchestrator {
        &self.orchestrator
    }

    /// A model that fails is recorded as `{error}` in its slot; the rest
    /// still run.
    pub async fn compare(&self, request: &AnalysisRequest, models: &[String]) -> ComparisonReport {
        let mut unique: Vec<&str> = Vec::new();
        for model in models.iter().map(|m| m.trim()).filter(|m| !m.is_empty()) {
            if !unique.contains(&model) {
                unique.push(model);
            }
        }

        tracing::info!(
            "Comparing {} models on '{}'",
            unique.len(),
            request.filename
        );

        let mut results = Vec::with_capacity(unique.len());
        for chunk in unique.chunks(self.max_concurrent) {
            let batch = chunk.iter().map(|model| async move {
                let result = match self.orchestrator.analyze(request, model).await {
                    Ok(report) => ModelResult::Report(Box::new(report)),
                    Err(e) => {
                        tracing::warn!("{} failed: {}", model, e);
                        ModelResult::Error {
                            error: e.to_string(),
                        }
                    }
                };
                (model.to_string(), result)
            });

            results.extend(join_all(batch).await);
        }

        build_report(results)
    }
}

/// Derives comparison metrics from per-model results, in request order.
pub fn build_report(results: Vec<(String, ModelResult)>) -> ComparisonReport {
    let accuracy_scores = results
        .iter()
        .map(|(model, result)| {
            let score = result.report().map_or(0.0, accuracy_score);
            (model.clone(), score)
        })
        .collect();

    let performance_comparison = results
        .iter()
        .filter_map(|(model, result)| {
            result
                .report()
                .map(|report| (model.clone(), performance_summary(report)))
        })
        .collect();

    let comparison_metrics = ComparisonMetrics {
        models_compared: results.len(),
        accuracy_scores,
        consensus_issues: consensus_issues(&results),
        performance_comparison,
    };

    ComparisonReport {
        individual_results: results.into_iter().collect::<BTreeMap<_, _>>(),
        comparison_metrics,
    }
}

/// `50·mean_confidence + 30·min(issues/10, 1) + 20·(risk_score/10)`, 0–100.
pub fn accuracy_score(report: &AnalysisReport) -> f64 {
    let confidence = report.mean_confidence();
    let coverage = (report.issues.len() as f64 / 10.0).min(1.0);
    let risk = report.overall_risk_score / 10.0;

    round_to(50.0 * confidence + 30.0 * coverage + 20.0 * risk, 2)
}

/// Groups issues by (category, risk level) and keeps groups reported by at
/// least two distinct models, most-agreed first. Fallback reports do not
/// contribute.
pub fn consensus_issues(results: &[(String, ModelResult)]) -> Vec<ConsensusIssue> {
    let mut groups: Vec<ConsensusIssue> = Vec::new();

    for (model, result) in results {
        let Some(report) = result.report().filter(|r| !r.is_fallback()) else {
            continue;
        };

        for issue in &report.issues {
            let position = groups
                .iter()
                .position(|g| g.category == issue.category && g.risk_level == issue.risk_level);

            let group = match position {
                Some(index) => &mut groups[index],
                None => {
                    groups.push(ConsensusIssue {
                        category: issue.category,
                        risk_level: issue.risk_level,
                        count: 0,
                        models: Vec::new(),
                    });
                    let last = groups.len() - 1;
                    &mut groups[last]
                }
            };

            if !group.models.contains(model) {
                group.models.push(model.clone());
                group.count = group.models.len();
            }
        }
    }

    groups.retain(|g| g.count >= 2);
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

pub fn performance_summary(report: &AnalysisReport) -> PerformanceSummary {
    let metrics = &report.performance_metrics;
    PerformanceSummary {
        response_time: round_to(metrics.response_time, 2),
        tokens_used: metrics.tokens_used,
        issues_found: metrics.issues_found,
        confidence_avg: round_to(metrics.confidence_avg, 3),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
