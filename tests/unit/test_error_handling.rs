use legalmind::analyzer::llm_client::{classify_error_response, resolve_provider, ProviderKind};
use legalmind::analyzer::normalizer::normalize_analysis;
use legalmind::analyzer::ProviderRegistry;
use legalmind::document::ensure_minimum_length;
use legalmind::error::{FailureKind, LegalMindError};

#[test]
fn unknown_model_is_unsupported() {
    let err = resolve_provider("llama-3-70b").unwrap_err();
    assert!(matches!(err, LegalMindError::UnsupportedModel(_)));
    assert_eq!(err.exit_code(), 6);
}

#[test]
fn missing_key_is_configuration_error_with_env_var_name() {
    let err = match ProviderRegistry::new().client_for("claude-3-5-haiku-latest") {
        Err(e) => e,
        Ok(_) => panic!("empty registry resolved a client"),
    };

    assert!(matches!(err, LegalMindError::Configuration(_)));
    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    assert_eq!(err.kind(), FailureKind::Fatal);
    assert_eq!(err.exit_code(), 6);
}

#[test]
fn rate_limit_classification_comes_from_status_and_error_code() {
    let err = classify_error_response(ProviderKind::Google, 429, "Too Many Requests");
    assert_eq!(err.kind(), FailureKind::RateLimited);
    assert!(err.is_retryable());

    let err = classify_error_response(
        ProviderKind::OpenAi,
        429,
        r#"{"error":{"message":"Rate limit reached","type":"requests","code":"rate_limit_exceeded"}}"#,
    );
    assert_eq!(err.kind(), FailureKind::RateLimited);
}

#[test]
fn message_text_never_decides_the_class() {
    // "quota" in a 500 body is still a fatal provider error.
    let err = classify_error_response(
        ProviderKind::Google,
        500,
        r#"{"error":{"code":500,"message":"quota service unavailable","status":"INTERNAL"}}"#,
    );
    assert_eq!(err.kind(), FailureKind::Fatal);
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn unparseable_output_is_malformed_not_fatal() {
    let err = normalize_analysis("Here is my analysis: the contract looks fine.").unwrap_err();
    assert_eq!(err.kind(), FailureKind::MalformedResponse);
    assert!(err.is_retryable());
}

#[test]
fn short_document_is_rejected_with_extraction_exit_code() {
    let err = ensure_minimum_length("Too short to be a contract.").unwrap_err();
    assert!(matches!(err, LegalMindError::DocumentTooShort { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn timeout_has_its_own_exit_code() {
    let err = LegalMindError::AnalysisTimeout { timeout: 120 };
    assert_eq!(err.to_string(), "Analysis timeout after 120 seconds");
    assert_eq!(err.exit_code(), 4);
}
