use crate::analyzer::llm_client::{
    api_model_name, GenerationRequest, LlmProvider, ProviderKind, ProviderRegistry,
};
use crate::analyzer::normalizer::{normalize_analysis, normalize_summary};
use crate::analyzer::prompts::{
    PromptTemplate, ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE, SUMMARY_MAX_TOKENS,
    SUMMARY_TEMPERATURE,
};
use crate::analyzer::retry::{fallback_analysis, RetryController, RetryOutcome, RetryPolicy};
use crate::error::LegalMindError;
use crate::models::{
    mean_confidence, AnalysisMetadata, AnalysisReport, AnalysisRequest, ExecutiveSummary,
    NormalizedAnalysis, PerformanceMetrics,
};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tokio::time::{timeout, Duration, Instant};

/// Runs one document through one model: main analysis, executive summary,
/// metrics. Holds no per-analysis state, so one instance can serve
/// concurrent calls.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    registry: ProviderRegistry,
    retry: RetryController,
    deadline: Option<Duration>,
}

impl AnalysisOrchestrator {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            retry: RetryController::default(),
            deadline: None,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = RetryController::new(policy);
        self
    }

    /// Caps the whole analysis, retry waits included.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Only fatal provider errors, configuration errors and the deadline
    /// surface as `Err`. Rate limiting and malformed output end in a fallback
    /// report.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        model: &str,
    ) -> Result<AnalysisReport, LegalMindError> {
        let model = model.trim();
        let (kind, client) = self.registry.client_for(model)?;

        tracing::info!(
            "Analyzing '{}' with {} ({} depth, {} characters)",
            request.filename,
            model,
            request.depth.as_str(),
            request.document_length()
        );

        let analysis = self.run_analysis(request, model, kind, client.as_ref());

        match self.deadline {
            Some(deadline) => timeout(deadline, analysis)
                .await
                .map_err(|_| LegalMindError::AnalysisTimeout {
                    timeout: deadline.as_secs(),
                })?,
            None => analysis.await,
        }
    }

    async fn run_analysis(
        &self,
        request: &AnalysisRequest,
        model: &str,
        kind: ProviderKind,
        client: &dyn LlmProvider,
    ) -> Result<AnalysisReport, LegalMindError> {
        let started = Instant::now();

        let main_request = GenerationRequest {
            model: api_model_name(model).to_string(),
            system: Some(PromptTemplate::analysis_system_prompt().to_string()),
            prompt: PromptTemplate::build_analysis_prompt(
                &request.text,
                request.depth,
                &request.focus_areas,
            ),
            temperature: ANALYSIS_TEMPERATURE,
            max_output_tokens: ANALYSIS_MAX_TOKENS,
        };
        tracing::debug!("Analysis prompt: {} characters", main_request.prompt.len());

        let label = format!("{} analysis", model);
        let outcome = self
            .retry
            .run(&label, |_| {
                let main_request = &main_request;
                async move {
                    let response = client.generate(main_request).await?;
                    let analysis = normalize_analysis(&response.text)?;
                    Ok((analysis, response.usage.map_or(0, |u| u.total_tokens)))
                }
            })
            .await?;

        let (analysis, analysis_tokens) = match outcome {
            RetryOutcome::Succeeded { value, attempts, .. } => {
                if attempts > 1 {
                    tracing::info!("{} succeeded after {} attempts", label, attempts);
                }
                value
            }
            RetryOutcome::Exhausted {
                kind: failure,
                attempts,
                last_error,
                ..
            } => {
                tracing::warn!(
                    "{} degraded to fallback report after {} attempts: {}",
                    label,
                    attempts,
                    last_error
                );
                (fallback_analysis(failure), 0)
            }
        };

        let (summary, summary_tokens) = if analysis.is_fallback() {
            (ExecutiveSummary::degraded(), 0)
        } else {
            self.generate_summary(client, model, request, &analysis).await
        };

        let response_time = started.elapsed().as_secs_f64();
        let performance_metrics = PerformanceMetrics {
            response_time,
            tokens_used: analysis_tokens + summary_tokens,
            issues_found: analysis.issues.len(),
            confidence_avg: mean_confidence(&analysis.issues),
        };
        let analysis_metadata = AnalysisMetadata {
            filename: request.filename.clone(),
            analysis_depth: request.depth,
            focus_areas: request.focus_areas.clone(),
            document_length: request.document_length(),
            model_used: model.to_string(),
            provider: kind.as_str().to_string(),
            response_time,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        tracing::info!(
            "{} finished in {:.2}s: {} issues, risk score {:.1}, {} tokens",
            label,
            response_time,
            performance_metrics.issues_found,
            analysis.overall_risk_score,
            performance_metrics.tokens_used
        );

        Ok(AnalysisReport::assemble(
            analysis,
            summary,
            analysis_metadata,
            performance_metrics,
        ))
    }

    /// Single attempt. Any failure yields [`ExecutiveSummary::unavailable`].
    async fn generate_summary(
        &self,
        client: &dyn LlmProvider,
        model: &str,
        request: &AnalysisRequest,
        analysis: &NormalizedAnalysis,
    ) -> (ExecutiveSummary, u64) {
        let analysis_json = match serde_json::to_string_pretty(analysis) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Could not serialize analysis for summary: {}", e);
                return (ExecutiveSummary::unavailable(), 0);
            }
        };

        let summary_request = GenerationRequest {
            model: api_model_name(model).to_string(),
            system: Some(PromptTemplate::summary_system_prompt().to_string()),
            prompt: PromptTemplate::build_summary_prompt(
                &analysis_json,
                request.document_length(),
                analysis.issues.len(),
            ),
            temperature: SUMMARY_TEMPERATURE,
            max_output_tokens: SUMMARY_MAX_TOKENS,
        };

        match client.generate(&summary_request).await {
            Ok(response) => {
                let tokens = response.usage.map_or(0, |u| u.total_tokens);
                match normalize_summary(&response.text) {
                    Ok(summary) => (summary, tokens),
                    Err(e) => {
                        tracing::warn!("{} summary unusable: {}", model, e);
                        (ExecutiveSummary::unavailable(), tokens)
                    }
                }
            }
            Err(e) => {
                tracing::warn!("{} summary call failed: {}", model, e);
                (ExecutiveSummary::unavailable(), 0)
            }
        }
    }
}

impl From<Arc<dyn LlmProvider>> for AnalysisOrchestrator {
    fn from(client: Arc<dyn LlmProvider>) -> Self {
        Self::new(ProviderRegistry::new().with_provider(client))
    }
}
