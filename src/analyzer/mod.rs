// Analyzer module - provider integration, retry, and analysis orchestration

pub mod comparator;
pub mod llm_client;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod retry;

pub use comparator::ModelComparator;
pub use llm_client::{
    create_llm_client, GenerationRequest, LlmConfig, LlmProvider, ProviderKind, ProviderRegistry,
    ProviderResponse, TokenUsage, DEFAULT_MODEL,
};
pub use orchestrator::AnalysisOrchestrator;
pub use prompts::PromptTemplate;
pub use retry::{fallback_analysis, RetryController, RetryOutcome, RetryPolicy};
