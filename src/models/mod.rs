pub mod analysis;
pub mod comparison;
pub mod issue;
pub mod report;

pub use analysis::{AnalysisDepth, AnalysisRequest};
pub use comparison::{
    ComparisonMetrics, ComparisonReport, ConsensusIssue, ModelResult, PerformanceSummary,
};
pub use issue::{Issue, LegalCategory, RiskLevel, Urgency};
pub use report::{
    mean_confidence, AnalysisMetadata, AnalysisReport, ExecutiveSummary, NormalizedAnalysis,
    PerformanceMetrics, RiskBreakdown, RATE_LIMITED_DOCUMENT_TYPE, UNPARSEABLE_DOCUMENT_TYPE,
};
