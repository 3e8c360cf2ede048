use crate::error::{FailureKind, LegalMindError};
use crate::models::{
    Issue, LegalCategory, NormalizedAnalysis, RiskLevel, Urgency, RATE_LIMITED_DOCUMENT_TYPE,
    UNPARSEABLE_DOCUMENT_TYPE,
};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// First rate-limit wait; doubles on every further rate-limited attempt.
    pub rate_limit_base_delay: Duration,
    /// Fixed wait after an unparseable response.
    pub malformed_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_base_delay: Duration::from_secs(60),
            malformed_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, kind: FailureKind, attempt: u32) -> Option<Duration> {
        match kind {
            FailureKind::RateLimited => {
                let exponent = attempt.saturating_sub(1).min(16);
                Some(self.rate_limit_base_delay * 2u32.pow(exponent))
            }
            FailureKind::MalformedResponse => Some(self.malformed_delay),
            FailureKind::Fatal => None,
        }
    }
}

enum RetryState<T> {
    Attempting { attempt: u32 },
    Waiting { attempt: u32, delay: Duration },
    Exhausted { kind: FailureKind, attempts: u32, error: LegalMindError },
    Succeeded { value: T, attempts: u32 },
}

#[derive(Debug)]
pub enum RetryOutcome<T> {
    Succeeded {
        value: T,
        attempts: u32,
        waits: Vec<Duration>,
    },
    Exhausted {
        kind: FailureKind,
        attempts: u32,
        last_error: String,
        waits: Vec<Duration>,
    },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn waits(&self) -> &[Duration] {
        match self {
            RetryOutcome::Succeeded { waits, .. } | RetryOutcome::Exhausted { waits, .. } => waits,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RetryController {
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Drives `operation` until it succeeds, fails fatally, or the attempt
    /// budget runs out.
    ///
    /// Fatal errors are returned as `Err` immediately. Rate-limited and
    /// malformed failures are retried per the policy and end in
    /// [`RetryOutcome::Exhausted`] rather than an error.
    pub async fn run<T, F, Fut>(
        &self,
        label: &str,
        mut operation: F,
    ) -> Result<RetryOutcome<T>, LegalMindError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LegalMindError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut waits = Vec::new();
        let mut state = RetryState::Attempting { attempt: 1 };

        loop {
            state = match state {
                RetryState::Attempting { attempt } => match operation(attempt).await {
                    Ok(value) => RetryState::Succeeded {
                        value,
                        attempts: attempt,
                    },
                    Err(error) => {
                        let kind = error.kind();
                        let delay = self.policy.delay_for(kind, attempt);

                        match delay {
                            None => return Err(error),
                            Some(_) if attempt >= max_attempts => {
                                tracing::warn!(
                                    "{}: giving up after {} attempts: {}",
                                    label,
                                    attempt,
                                    error
                                );
                                RetryState::Exhausted {
                                    kind,
                                    attempts: attempt,
                                    error,
                                }
                            }
                            Some(delay) => {
                                tracing::warn!(
                                    "{}: attempt {}/{} failed ({}). Waiting {} seconds before retry",
                                    label,
                                    attempt,
                                    max_attempts,
                                    error,
                                    delay.as_secs()
                                );
                                RetryState::Waiting { attempt, delay }
                            }
                        }
                    }
                },
                RetryState::Waiting { attempt, delay } => {
                    tokio::time::sleep(delay).await;
                    waits.push(delay);
                    RetryState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                RetryState::Exhausted {
                    kind,
                    attempts,
                    error,
                } => {
                    return Ok(RetryOutcome::Exhausted {
                        kind,
                        attempts,
                        last_error: error.to_string(),
                        waits,
                    })
                }
                RetryState::Succeeded { value, attempts } => {
                    return Ok(RetryOutcome::Succeeded {
                        value,
                        attempts,
                        waits,
                    })
                }
            };
        }
    }
}

/// Deterministic stand-in analysis used once retries are exhausted.
pub fn fallback_analysis(kind: FailureKind) -> NormalizedAnalysis {
    match kind {
        FailureKind::MalformedResponse => unparseable_fallback(),
        FailureKind::RateLimited | FailureKind::Fatal => rate_limited_fallback(),
    }
}

fn rate_limited_fallback() -> NormalizedAnalysis {
    NormalizedAnalysis {
        issues: vec![
            Issue {
                title: "API Rate Limit Reached".to_string(),
                description: "The AI analysis service has reached its rate limit. The document \
                    could not be analyzed live; this report describes the degraded condition \
                    instead of the document's contents."
                    .to_string(),
                category: LegalCategory::System,
                risk_level: RiskLevel::Medium,
                confidence: 0.9,
                potential_impact: "Analysis cannot be completed at this time due to API limitations"
                    .to_string(),
                recommendations: vec![
                    "Wait for rate limits to reset (typically 1 minute for free tier)".to_string(),
                    "Consider upgrading to a paid API plan for higher rate limits".to_string(),
                    "Use shorter documents to reduce token usage".to_string(),
                    "Try again later when quotas have reset".to_string(),
                ],
                legal_citation: "Not applicable - technical limitation".to_string(),
                urgency: Urgency::Low,
            },
            Issue {
                title: "Document Analysis Unavailable".to_string(),
                description: "No legal issues were evaluated for this document. Re-run the \
                    analysis to obtain a real issue list."
                    .to_string(),
                category: LegalCategory::General,
                risk_level: RiskLevel::Low,
                confidence: 0.8,
                potential_impact: "Issues present in the document have not been identified"
                    .to_string(),
                recommendations: vec![
                    "Try the analysis again in a few minutes".to_string(),
                    "Consider using Quick analysis mode to reduce token usage".to_string(),
                ],
                legal_citation: "Not applicable - technical limitation".to_string(),
                urgency: Urgency::Low,
            },
        ],
        overall_risk_score: 3.0,
        document_type: RATE_LIMITED_DOCUMENT_TYPE.to_string(),
        compliance_flags: vec!["API rate limits reached".to_string()],
        positive_aspects: vec!["System gracefully handles API limitations".to_string()],
    }
}

fn unparseable_fallback() -> NormalizedAnalysis {
    NormalizedAnalysis {
        issues: vec![Issue {
            title: "Model Output Could Not Be Parsed".to_string(),
            description: "The AI provider responded, but repeatedly returned text that was not \
                the requested JSON structure. This usually indicates prompt or schema drift \
                rather than a provider outage."
                .to_string(),
            category: LegalCategory::System,
            risk_level: RiskLevel::Medium,
            confidence: 0.9,
            potential_impact: "Analysis cannot be completed until the model returns structured output"
                .to_string(),
            recommendations: vec![
                "Retry the analysis".to_string(),
                "Try a different model".to_string(),
                "Report the failure if it persists".to_string(),
            ],
            legal_citation: "Not applicable - technical limitation".to_string(),
            urgency: Urgency::Low,
        }],
        overall_risk_score: 3.0,
        document_type: UNPARSEABLE_DOCUMENT_TYPE.to_string(),
        compliance_flags: vec!["Model output could not be parsed".to_string()],
        positive_aspects: vec!["System gracefully handles malformed model output".to_string()],
    }
}
