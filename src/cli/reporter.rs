use crate::analyzer::ProviderRegistry;
use crate::analyzer::llm_client::AVAILABLE_MODELS;
use crate::cli::args::{Cli, OutputFormat};
use crate::document::DocumentStats;
use crate::error::LegalMindError;
use crate::models::{AnalysisReport, ComparisonReport, Issue, ModelResult, RiskLevel};

const RULE_WIDTH: usize = 80;

/// Renders reports for the terminal (text) or for other programs (JSON).
pub struct ReportFormatter {
    format: OutputFormat,
    use_colors: bool,
    verbose: bool,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            use_colors: std::env::var("NO_COLOR").is_err(),
            verbose,
        }
    }

    pub fn for_cli(cli: &Cli) -> Self {
        Self::new(cli.format, cli.verbose)
    }

    pub fn plain(format: OutputFormat) -> Self {
        Self {
            format,
            use_colors: false,
            verbose: false,
        }
    }

    pub fn format_analysis_report(
        &self,
        report: &AnalysisReport,
        stats: Option<&DocumentStats>,
    ) -> Result<String, LegalMindError> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Text => Ok(self.analysis_text(report, stats)),
        }
    }

    pub fn format_comparison_report(
        &self,
        comparison: &ComparisonReport,
    ) -> Result<String, LegalMindError> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(comparison)?),
            OutputFormat::Text => Ok(self.comparison_text(comparison)),
        }
    }

    pub fn format_models(&self, registry: &ProviderRegistry) -> Result<String, LegalMindError> {
        if self.format == OutputFormat::Json {
            let models: Vec<_> = AVAILABLE_MODELS
                .iter()
                .map(|info| {
                    serde_json::json!({
                        "id": info.id,
                        "display_name": info.display_name,
                        "provider": info.provider.as_str(),
                        "configured": registry.is_configured(info.provider),
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&models)?);
        }

        let mut lines = vec![self.heading("AVAILABLE MODELS")];
        for info in AVAILABLE_MODELS {
            let status = if registry.is_configured(info.provider) {
                "ready".to_string()
            } else {
                format!("{} not set", info.provider.api_key_env())
            };
            lines.push(format!(
                "{:<26} {:<20} {:<10} {}",
                info.id,
                info.display_name,
                info.provider.as_str(),
                status
            ));
        }
        Ok(lines.join("\n"))
    }

    fn analysis_text(&self, report: &AnalysisReport, stats: Option<&DocumentStats>) -> String {
        let metadata = &report.analysis_metadata;
        let mut lines = Vec::new();

        lines.push("=".repeat(RULE_WIDTH));
        lines.push(self.bold("LEGAL DOCUMENT ANALYSIS REPORT"));
        lines.push("=".repeat(RULE_WIDTH));
        lines.push(String::new());

        lines.push(self.heading("DOCUMENT INFORMATION"));
        lines.push(format!("Filename: {}", metadata.filename));
        lines.push(format!("Analysis Date: {}", metadata.timestamp));
        lines.push(format!("Analysis Depth: {}", metadata.analysis_depth.as_str()));
        if !metadata.focus_areas.is_empty() {
            lines.push(format!("Focus Areas: {}", metadata.focus_areas.join(", ")));
        }
        lines.push(format!(
            "Document Length: {} characters",
            metadata.document_length
        ));
        lines.push(format!(
            "AI Model Used: {} ({})",
            metadata.model_used, metadata.provider
        ));
        if self.verbose {
            if let Some(stats) = stats {
                lines.push(format!(
                    "Statistics: {} words, {} sentences, {} paragraphs",
                    stats.word_count, stats.sentence_count, stats.paragraph_count
                ));
            }
        }
        lines.push(String::new());

        if report.is_fallback() {
            lines.push(self.warning(&format!(
                "Degraded result: {}. No live analysis was obtained.",
                report.document_type
            )));
            lines.push(String::new());
        }

        if !report.executive_summary.is_empty() {
            lines.push(self.heading("EXECUTIVE SUMMARY"));
            lines.push(report.executive_summary.clone());
            lines.push(String::new());
        }

        let breakdown = report.risk_breakdown();
        lines.push(self.heading("OVERALL ASSESSMENT"));
        lines.push(format!(
            "Overall Risk Score: {:.1}/10",
            report.overall_risk_score
        ));
        lines.push(format!("Document Type: {}", report.document_type));
        lines.push(format!("Total Issues Identified: {}", report.issues.len()));
        lines.push(format!("  - High Risk Issues: {}", breakdown.high));
        lines.push(format!("  - Medium Risk Issues: {}", breakdown.medium));
        lines.push(format!("  - Low Risk Issues: {}", breakdown.low));
        lines.push(String::new());

        push_bullets(&mut lines, &self.heading("KEY FINDINGS"), &report.key_findings);

        if !report.issues.is_empty() {
            lines.push(self.heading("DETAILED ISSUES ANALYSIS"));
            for risk_level in [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low] {
                let group: Vec<&Issue> = report.issues_with_risk(risk_level).collect();
                if group.is_empty() {
                    continue;
                }

                let title = format!(
                    "{} {} RISK ISSUES:",
                    risk_level.as_emoji(),
                    risk_level.as_str().to_uppercase()
                );
                lines.push(String::new());
                lines.push(self.colored_risk(risk_level, &title));
                for (index, issue) in group.iter().enumerate() {
                    lines.push(String::new());
                    lines.extend(format_issue(index + 1, issue));
                }
            }
            lines.push(String::new());
        }

        push_bullets(
            &mut lines,
            &self.heading("COMPLIANCE CONSIDERATIONS"),
            &report.compliance_flags,
        );
        push_bullets(
            &mut lines,
            &self.heading("POSITIVE ASPECTS"),
            &report.positive_aspects,
        );

        if !report.next_steps.is_empty() {
            lines.push(self.heading("RECOMMENDED NEXT STEPS"));
            for (index, step) in report.next_steps.iter().enumerate() {
                lines.push(format!("{}. {}", index + 1, step));
            }
            lines.push(String::new());
        }

        let metrics = &report.performance_metrics;
        lines.push(self.heading("PERFORMANCE"));
        lines.push(format!("Response Time: {:.2}s", metrics.response_time));
        lines.push(format!("Tokens Used: {}", metrics.tokens_used));
        lines.push(format!(
            "Average Confidence: {:.1}%",
            metrics.confidence_avg * 100.0
        ));
        lines.push("=".repeat(RULE_WIDTH));

        lines.join("\n")
    }

    fn comparison_text(&self, comparison: &ComparisonReport) -> String {
        let metrics = &comparison.comparison_metrics;
        let mut lines = Vec::new();

        lines.push("=".repeat(RULE_WIDTH));
        lines.push(self.bold("MODEL COMPARISON REPORT"));
        lines.push("=".repeat(RULE_WIDTH));
        lines.push(format!("Models Compared: {}", metrics.models_compared));
        lines.push(String::new());

        lines.push(self.heading("ACCURACY AND PERFORMANCE"));
        lines.push(format!(
            "{:<26} {:>8} {:>9} {:>8} {:>7} {:>10}",
            "Model", "Score", "Time (s)", "Tokens", "Issues", "Confidence"
        ));
        for (model, score) in &metrics.accuracy_scores {
            let degraded = comparison
                .individual_results
                .get(model)
                .and_then(ModelResult::report)
                .is_some_and(|report| report.is_fallback());

            match metrics.performance_comparison.get(model) {
                Some(perf) => lines.push(format!(
                    "{:<26} {:>8.2} {:>9.2} {:>8} {:>7} {:>10.3}{}",
                    model,
                    score,
                    perf.response_time,
                    perf.tokens_used,
                    perf.issues_found,
                    perf.confidence_avg,
                    if degraded { "  (degraded, not ranked)" } else { "" }
                )),
                None => lines.push(format!("{:<26} {:>8.2} {:>9}", model, score, "failed")),
            }
        }
        if let Some((model, score)) = comparison.best_model() {
            lines.push(String::new());
            lines.push(format!("Best Model: {} ({:.2})", model, score));
        }
        lines.push(String::new());

        let failures: Vec<String> = comparison
            .failed_models()
            .map(|(model, error)| format!("{}: {}", model, error))
            .collect();
        if !failures.is_empty() {
            lines.push(self.heading("ERRORS"));
            for failure in failures {
                lines.push(self.warning(&failure));
            }
            lines.push(String::new());
        }

        lines.push(self.heading("CONSENSUS ISSUES"));
        if metrics.consensus_issues.is_empty() {
            lines.push("No issue category was reported by more than one model.".to_string());
        }
        for consensus in &metrics.consensus_issues {
            lines.push(format!(
                "{} {} / {} risk: {} models ({})",
                consensus.risk_level.as_emoji(),
                consensus.category.as_str(),
                consensus.risk_level.as_str(),
                consensus.count,
                consensus.models.join(", ")
            ));
        }
        lines.push("=".repeat(RULE_WIDTH));

        lines.join("\n")
    }

    fn heading(&self, title: &str) -> String {
        format!("{}\n{}", self.bold(title), "-".repeat(30))
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            format!("\x1b[1m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            format!("\x1b[33m⚠️  {}\x1b[0m", text)
        } else {
            format!("WARNING: {}", text)
        }
    }

    fn colored_risk(&self, risk_level: RiskLevel, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        let color = match risk_level {
            RiskLevel::High => "\x1b[1m\x1b[31m",
            RiskLevel::Medium => "\x1b[1m\x1b[33m",
            RiskLevel::Low => "\x1b[1m\x1b[32m",
        };
        format!("{}{}\x1b[0m", color, text)
    }
}

fn format_issue(number: usize, issue: &Issue) -> Vec<String> {
    let mut lines = vec![
        format!("{}. {}", number, issue.title),
        format!("   Category: {}", issue.category.as_str()),
        format!("   Confidence: {:.1}%", issue.confidence * 100.0),
        format!("   Urgency: {}", issue.urgency.as_str()),
        format!("   Description: {}", issue.description),
        format!("   Potential Impact: {}", issue.potential_impact),
    ];

    if !issue.recommendations.is_empty() {
        lines.push("   Recommendations:".to_string());
        lines.extend(issue.recommendations.iter().map(|r| format!("   • {}", r)));
    }
    if !issue.legal_citation.is_empty() {
        lines.push(format!("   Legal Citation: {}", issue.legal_citation));
    }
    lines
}

fn push_bullets(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    lines.extend(items.iter().map(|item| format!("• {}", item)));
    lines.push(String::new());
}
