use clap::Parser;
use legalmind::analyzer::{create_llm_client, LlmConfig, ProviderKind, ProviderRegistry};
use legalmind::cli::{Cli, CliHandler};
use legalmind::models::{AnalysisReport, ComparisonReport, LegalCategory, RiskLevel};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::io::Write;

const CONTRACT: &str = "SOFTWARE SERVICES AGREEMENT

This Agreement is entered into between Vendor Inc. (\"Vendor\") and Client LLC (\"Client\").

1. The Vendor shall provide hosting services. The Client shall indemnify the Vendor against any \
and all claims, without limitation.

2. This Agreement renews automatically for successive one-year terms unless terminated with \
ninety days written notice.

3. Vendor may process Client personal data in any jurisdiction.";

fn analysis_body() -> String {
    let analysis = json!({
        "issues": [
            {
                "title": "Unlimited indemnification",
                "description": "Client indemnity has no cap.",
                "risk_level": "High",
                "category": "Liability",
                "confidence": 0.92,
                "recommendations": ["Cap indemnity at fees paid"],
                "urgency": "Immediate"
            },
            {
                "title": "Unrestricted data transfers",
                "risk_level": "medium",
                "category": "Privacy & Data Protection",
                "confidence": "0.8"
            }
        ],
        "overall_risk_score": 7,
        "document_type": "Software Services Agreement",
        "compliance_flags": ["GDPR cross-border transfer"],
        "positive_aspects": ["Clear termination notice period"]
    });
    gemini_envelope(&format!("```json\n{}\n```", analysis), 900)
}

fn summary_body() -> String {
    let summary = json!({
        "executive_summary": "High liability exposure driven by uncapped indemnity.",
        "key_findings": ["Uncapped indemnity", "Data may leave the EEA"],
        "next_steps": ["Negotiate an indemnity cap"]
    });
    gemini_envelope(&summary.to_string(), 250)
}

fn gemini_envelope(text: &str, total_tokens: u64) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"totalTokenCount": total_tokens}
    })
    .to_string()
}

async fn mock_gemini() -> ServerGuard {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .match_body(Matcher::Regex("senior legal analyst".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(analysis_body())
        .create_async()
        .await;

    server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .match_body(Matcher::Regex("legal consultant".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(summary_body())
        .create_async()
        .await;

    server
}

fn registry(server: &ServerGuard) -> ProviderRegistry {
    let config = LlmConfig::new(ProviderKind::Google, "test-key", 30).with_base_url(server.url());
    ProviderRegistry::new().with_provider(create_llm_client(ProviderKind::Google, config).unwrap())
}

fn contract_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("services")
        .suffix(".txt")
        .tempfile()
        .unwrap();
    file.write_all(CONTRACT.as_bytes()).unwrap();
    file
}

async fn render(server: &ServerGuard, args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    CliHandler::new(cli)
        .with_registry(registry(server))
        .render()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_analyze_document_end_to_end() {
    let server = mock_gemini().await;
    let file = contract_file();
    let path = file.path().to_str().unwrap();

    let output = render(
        &server,
        &[
            "legalmind",
            "analyze",
            path,
            "--model",
            "gemini-2.0-flash",
            "--depth",
            "quick",
            "--focus",
            "liability",
            "--format",
            "json",
        ],
    )
    .await;

    let report: AnalysisReport = serde_json::from_str(&output).unwrap();

    assert_eq!(report.document_type, "Software Services Agreement");
    assert_eq!(report.issues.len(), 2);
    assert_eq!(report.issues[0].category, LegalCategory::Liability);
    assert_eq!(report.issues[0].risk_level, RiskLevel::High);
    assert_eq!(report.issues[1].confidence, 0.8);
    assert_eq!(report.overall_risk_score, 7.0);
    assert_eq!(
        report.executive_summary,
        "High liability exposure driven by uncapped indemnity."
    );
    assert_eq!(report.next_steps, vec!["Negotiate an indemnity cap"]);

    assert_eq!(report.analysis_metadata.model_used, "gemini-2.0-flash");
    assert_eq!(report.analysis_metadata.provider, "google");
    assert_eq!(report.analysis_metadata.focus_areas, vec!["Liability"]);
    assert_eq!(report.analysis_metadata.document_length, CONTRACT.chars().count());
    assert!(report.analysis_metadata.filename.starts_with("services"));

    assert_eq!(report.performance_metrics.tokens_used, 1150);
    assert_eq!(report.performance_metrics.issues_found, 2);
    assert!(!report.is_fallback());
}

#[tokio::test]
async fn test_text_report_sections() {
    let server = mock_gemini().await;
    let file = contract_file();
    let path = file.path().to_str().unwrap();

    let output = render(
        &server,
        &["legalmind", "analyze", path, "--model", "gemini-2.0-flash"],
    )
    .await;

    assert!(output.contains("EXECUTIVE SUMMARY"));
    assert!(output.contains("Overall Risk Score: 7.0/10"));
    assert!(output.contains("HIGH RISK ISSUES:"));
    assert!(output.contains("Unlimited indemnification"));
    assert!(output.contains("Negotiate an indemnity cap"));
    assert!(!output.contains("Degraded result"));
}

#[tokio::test]
async fn test_compare_isolates_unconfigured_provider() {
    let server = mock_gemini().await;
    let file = contract_file();
    let path = file.path().to_str().unwrap();

    let output = render(
        &server,
        &[
            "legalmind",
            "compare",
            path,
            "--models",
            "gemini-2.0-flash,gpt-4o-mini",
            "--format",
            "json",
        ],
    )
    .await;

    let comparison: ComparisonReport = serde_json::from_str(&output).unwrap();
    let metrics = &comparison.comparison_metrics;

    assert_eq!(metrics.models_compared, 2);
    assert!(metrics.accuracy_scores["gemini-2.0-flash"] > 0.0);
    assert_eq!(metrics.accuracy_scores["gpt-4o-mini"], 0.0);
    assert!(metrics.performance_comparison.contains_key("gemini-2.0-flash"));
    assert!(!metrics.performance_comparison.contains_key("gpt-4o-mini"));
    assert!(metrics.consensus_issues.is_empty());

    let gemini = comparison.individual_results["gemini-2.0-flash"]
        .report()
        .unwrap();
    assert_eq!(gemini.issues.len(), 2);

    let error = comparison.individual_results["gpt-4o-mini"].error().unwrap();
    assert!(error.contains("OPENAI_API_KEY"));
}
