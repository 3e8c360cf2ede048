use crate::models::analysis::AnalysisDepth;
use crate::models::issue::{Issue, RiskLevel};
use serde::{Deserialize, Serialize};

/// `document_type` carried by the fallback report after rate-limit exhaustion.
pub const RATE_LIMITED_DOCUMENT_TYPE: &str = "Rate Limited Analysis";

/// `document_type` carried by the fallback report after repeated unparseable output.
pub const UNPARSEABLE_DOCUMENT_TYPE: &str = "Unparseable Model Output";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub issues: Vec<Issue>,
    pub overall_risk_score: f64,
    pub document_type: String,
    pub compliance_flags: Vec<String>,
    pub positive_aspects: Vec<String>,
    pub executive_summary: String,
    pub key_findings: Vec<String>,
    pub next_steps: Vec<String>,
    pub analysis_metadata: AnalysisMetadata,
    pub performance_metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub filename: String,
    pub analysis_depth: AnalysisDepth,
    pub focus_areas: Vec<String>,
    pub document_length: usize,
    pub model_used: String,
    pub provider: String,
    pub response_time: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub response_time: f64,
    pub tokens_used: u64,
    pub issues_found: usize,
    pub confidence_avg: f64,
}

/// Validated main-analysis payload, before summary and metadata are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAnalysis {
    pub issues: Vec<Issue>,
    pub overall_risk_score: f64,
    pub document_type: String,
    pub compliance_flags: Vec<String>,
    pub positive_aspects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub executive_summary: String,
    pub key_findings: Vec<String>,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl NormalizedAnalysis {
    pub fn is_fallback(&self) -> bool {
        self.document_type == RATE_LIMITED_DOCUMENT_TYPE
            || self.document_type == UNPARSEABLE_DOCUMENT_TYPE
    }

    pub fn is_rate_limited(&self) -> bool {
        self.document_type == RATE_LIMITED_DOCUMENT_TYPE
    }
}

impl AnalysisReport {
    pub fn assemble(
        analysis: NormalizedAnalysis,
        summary: ExecutiveSummary,
        analysis_metadata: AnalysisMetadata,
        performance_metrics: PerformanceMetrics,
    ) -> Self {
        Self {
            issues: analysis.issues,
            overall_risk_score: analysis.overall_risk_score,
            document_type: analysis.document_type,
            compliance_flags: analysis.compliance_flags,
            positive_aspects: analysis.positive_aspects,
            executive_summary: summary.executive_summary,
            key_findings: summary.key_findings,
            next_steps: summary.next_steps,
            analysis_metadata,
            performance_metrics,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.document_type == RATE_LIMITED_DOCUMENT_TYPE
            || self.document_type == UNPARSEABLE_DOCUMENT_TYPE
    }

    /// Mean issue confidence; 0 when there are no issues.
    pub fn mean_confidence(&self) -> f64 {
        mean_confidence(&self.issues)
    }

    pub fn risk_breakdown(&self) -> RiskBreakdown {
        let mut breakdown = RiskBreakdown::default();
        for issue in &self.issues {
            match issue.risk_level {
                RiskLevel::High => breakdown.high += 1,
                RiskLevel::Medium => breakdown.medium += 1,
                RiskLevel::Low => breakdown.low += 1,
            }
        }
        breakdown
    }

    pub fn issues_with_risk(&self, risk_level: RiskLevel) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.risk_level == risk_level)
    }
}

pub fn mean_confidence(issues: &[Issue]) -> f64 {
    if issues.is_empty() {
        return 0.0;
    }
    issues.iter().map(|i| i.confidence).sum::<f64>() / issues.len() as f64
}

impl ExecutiveSummary {
    /// Substituted when the main analysis already degraded to a fallback.
    pub fn degraded() -> Self {
        Self {
            executive_summary: "Analysis could not be completed because the AI provider was \
                unavailable or rate limited. The legal document analyzer identifies potential \
                issues in contracts and legal documents using AI. Please try again when rate \
                limits reset or consider using a shorter document."
                .to_string(),
            key_findings: vec![
                "AI provider rate limits or output errors prevented a live analysis".to_string(),
                "System provides graceful error handling".to_string(),
                "Fallback report generated".to_string(),
            ],
            next_steps: vec![
                "Wait for rate limits to reset (typically 1 minute)".to_string(),
                "Try with a shorter document".to_string(),
                "Consider upgrading API plan for production use".to_string(),
            ],
        }
    }

    /// Substituted when the summary call itself fails.
    pub fn unavailable() -> Self {
        Self {
            executive_summary: "Executive summary could not be generated due to processing error."
                .to_string(),
            key_findings: vec!["Analysis completed with identified issues".to_string()],
            next_steps: vec!["Review individual issues for detailed recommendations".to_string()],
        }
    }
}
