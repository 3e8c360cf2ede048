use legalmind::analyzer::comparator::{accuracy_score, build_report, consensus_issues};
use legalmind::analyzer::fallback_analysis;
use legalmind::error::FailureKind;
use legalmind::models::{
    mean_confidence, AnalysisDepth, AnalysisMetadata, AnalysisReport, ExecutiveSummary, Issue,
    LegalCategory, ModelResult, NormalizedAnalysis, PerformanceMetrics, RiskLevel,
};

fn report_from(analysis: NormalizedAnalysis, model: &str) -> AnalysisReport {
    let performance_metrics = PerformanceMetrics {
        response_time: 2.0,
        tokens_used: 1000,
        issues_found: analysis.issues.len(),
        confidence_avg: mean_confidence(&analysis.issues),
    };
    AnalysisReport::assemble(
        analysis,
        ExecutiveSummary::unavailable(),
        AnalysisMetadata {
            filename: "supply.txt".to_string(),
            analysis_depth: AnalysisDepth::Comprehensive,
            focus_areas: vec![],
            document_length: 3000,
            model_used: model.to_string(),
            provider: "test".to_string(),
            response_time: 2.0,
            timestamp: "2024-05-01T10:00:00Z".to_string(),
        },
        performance_metrics,
    )
}

fn report(model: &str, issues: Vec<Issue>, risk_score: f64) -> ModelResult {
    ModelResult::Report(Box::new(report_from(
        NormalizedAnalysis {
            issues,
            overall_risk_score: risk_score,
            document_type: "Supply Agreement".to_string(),
            compliance_flags: vec![],
            positive_aspects: vec![],
        },
        model,
    )))
}

fn issue(category: &str, risk: &str) -> Issue {
    Issue::new(
        format!("{} issue", category),
        LegalCategory::from_str(category).unwrap(),
        RiskLevel::from_str(risk).unwrap(),
    )
}

#[test]
fn consensus_requires_two_distinct_models() {
    let results = vec![
        ("A".to_string(), report("A", vec![issue("Liability", "High")], 5.0)),
        ("B".to_string(), report("B", vec![issue("Liability", "High")], 5.0)),
        ("C".to_string(), report("C", vec![issue("IP", "Low")], 5.0)),
    ];

    let consensus = consensus_issues(&results);

    assert_eq!(consensus.len(), 1);
    assert_eq!(consensus[0].category, LegalCategory::Liability);
    assert_eq!(consensus[0].risk_level, RiskLevel::High);
    assert_eq!(consensus[0].count, 2);
    assert_eq!(consensus[0].models, vec!["A", "B"]);
}

#[test]
fn consensus_is_sorted_by_agreement() {
    let results = vec![
        (
            "A".to_string(),
            report("A", vec![issue("Compliance", "Medium"), issue("Liability", "High")], 5.0),
        ),
        (
            "B".to_string(),
            report("B", vec![issue("Compliance", "Medium"), issue("Liability", "High")], 5.0),
        ),
        ("C".to_string(), report("C", vec![issue("Liability", "High")], 5.0)),
    ];

    let consensus = consensus_issues(&results);

    assert_eq!(consensus.len(), 2);
    assert_eq!(consensus[0].category, LegalCategory::Liability);
    assert_eq!(consensus[0].count, 3);
    assert_eq!(consensus[1].category, LegalCategory::Compliance);
    assert_eq!(consensus[1].count, 2);
}

#[test]
fn errored_and_fallback_models_do_not_form_consensus() {
    let rate_limited = ModelResult::Report(Box::new(report_from(
        fallback_analysis(FailureKind::RateLimited),
        "B",
    )));
    let results = vec![
        ("A".to_string(), ModelResult::Error { error: "boom".to_string() }),
        ("B".to_string(), rate_limited.clone()),
        ("C".to_string(), rate_limited),
    ];

    assert!(consensus_issues(&results).is_empty());
}

#[test]
fn empty_report_scores_exactly_zero() {
    let result = report("A", vec![], 0.0);
    assert_eq!(accuracy_score(result.report().unwrap()), 0.0);
}

#[test]
fn accuracy_is_rounded_to_two_decimals() {
    let issues = vec![
        issue("Liability", "High").with_confidence(0.91),
        issue("Compliance", "Low").with_confidence(0.77),
        issue("Liability", "Medium").with_confidence(0.6),
    ];
    let result = report("A", issues, 7.3);

    // 50*0.76 + 30*0.3 + 20*0.73 = 38 + 9 + 14.6
    assert_eq!(accuracy_score(result.report().unwrap()), 61.6);
}

#[test]
fn comparison_report_isolates_failures() {
    let comparison = build_report(vec![
        ("gemini-2.0-flash".to_string(), report("gemini-2.0-flash", vec![issue("Liability", "High")], 6.0)),
        (
            "gpt-4o-mini".to_string(),
            ModelResult::Error {
                error: "OpenAI API error (401): invalid api key".to_string(),
            },
        ),
    ]);

    let metrics = &comparison.comparison_metrics;
    assert_eq!(metrics.models_compared, 2);
    assert_eq!(metrics.accuracy_scores["gpt-4o-mini"], 0.0);
    assert!(metrics.accuracy_scores["gemini-2.0-flash"] > 0.0);
    assert_eq!(metrics.performance_comparison.len(), 1);
    assert_eq!(
        comparison.individual_results["gpt-4o-mini"].error(),
        Some("OpenAI API error (401): invalid api key")
    );

    let (best, _) = comparison.best_model().unwrap();
    assert_eq!(best, "gemini-2.0-flash");
}

#[test]
fn comparison_report_serializes_errors_in_place() {
    let comparison = build_report(vec![(
        "claude-3-5-haiku-latest".to_string(),
        ModelResult::Error {
            error: "Configuration error".to_string(),
        },
    )]);

    let json = serde_json::to_value(&comparison).unwrap();
    assert_eq!(
        json["individual_results"]["claude-3-5-haiku-latest"],
        serde_json::json!({"error": "Configuration error"})
    );
    assert_eq!(json["comparison_metrics"]["models_compared"], 1);
}

#[test]
fn best_model_tie_goes_to_first_id() {
    let comparison = build_report(vec![
        ("gemini-2.0-flash".to_string(), report("gemini-2.0-flash", vec![issue("Liability", "High")], 6.0)),
        (
            "claude-3-5-haiku-latest".to_string(),
            report("claude-3-5-haiku-latest", vec![issue("Liability", "High")], 6.0),
        ),
    ]);

    let (best, _) = comparison.best_model().unwrap();
    assert_eq!(best, "claude-3-5-haiku-latest");
}

#[test]
fn fallback_report_is_never_best_model() {
    let rate_limited = ModelResult::Report(Box::new(report_from(
        fallback_analysis(FailureKind::RateLimited),
        "gemini-2.0-flash",
    )));
    let live = report(
        "gpt-4o-mini",
        vec![issue("Liability", "Low").with_confidence(0.4)],
        2.0,
    );

    let comparison = build_report(vec![
        ("gemini-2.0-flash".to_string(), rate_limited),
        ("gpt-4o-mini".to_string(), live),
    ]);

    let scores = &comparison.comparison_metrics.accuracy_scores;
    assert!(scores["gemini-2.0-flash"] > scores["gpt-4o-mini"]);

    let (best, score) = comparison.best_model().unwrap();
    assert_eq!(best, "gpt-4o-mini");
    assert_eq!(score, scores["gpt-4o-mini"]);
}

#[test]
fn no_best_model_when_every_result_is_degraded() {
    let comparison = build_report(vec![
        (
            "gemini-2.0-flash".to_string(),
            ModelResult::Report(Box::new(report_from(
                fallback_analysis(FailureKind::MalformedResponse),
                "gemini-2.0-flash",
            ))),
        ),
        (
            "gpt-4o-mini".to_string(),
            ModelResult::Error {
                error: "Configuration error".to_string(),
            },
        ),
    ]);

    assert!(comparison.best_model().is_none());
}
