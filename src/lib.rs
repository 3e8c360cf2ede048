pub mod analyzer;
pub mod cli;
pub mod document;
pub mod error;
pub mod models;

pub use error::LegalMindError;

// Re-export commonly used types
pub use analyzer::{AnalysisOrchestrator, ModelComparator, ProviderRegistry};
pub use models::{
    AnalysisDepth, AnalysisReport, AnalysisRequest, ComparisonReport, Issue, LegalCategory,
    RiskLevel,
};

pub use cli::CliHandler;
