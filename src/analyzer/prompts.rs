use crate::models::{AnalysisDepth, LegalCategory};

/// Characters of document text sent with the analysis prompt.
pub const MAX_EXCERPT_CHARS: usize = 8000;
/// Characters of the main analysis JSON embedded in the summary prompt.
pub const MAX_SUMMARY_CONTEXT_CHARS: usize = 1000;

pub const ANALYSIS_TEMPERATURE: f32 = 0.1;
pub const ANALYSIS_MAX_TOKENS: u32 = 2000;
pub const SUMMARY_TEMPERATURE: f32 = 0.2;
pub const SUMMARY_MAX_TOKENS: u32 = 800;

const ANALYSIS_SCHEMA: &str = r#"Respond with a JSON object in the following format:
{
    "issues": [
        {
            "title": "Brief descriptive title of the issue",
            "description": "Detailed description of the legal issue or concern",
            "category": "Primary legal category",
            "risk_level": "High/Medium/Low",
            "confidence": 0.85,
            "potential_impact": "Description of potential consequences",
            "recommendations": ["Specific action item 1", "Specific action item 2"],
            "legal_citation": "Relevant laws or regulations if applicable",
            "urgency": "Immediate/High/Medium/Low"
        }
    ],
    "overall_risk_score": 7.5,
    "document_type": "Identified document type",
    "compliance_flags": ["List of potential compliance issues"],
    "positive_aspects": ["Well-drafted clauses or protective terms"]
}

Ensure all confidence scores are between 0.0 and 1.0, and the overall_risk_score is between 0 and 10."#;

pub struct PromptTemplate;

impl PromptTemplate {
    pub fn analysis_system_prompt() -> &'static str {
        "You are a senior legal analyst. Analyze the legal document you are given and identify \
         potential issues, risks and areas of concern. Respond with valid JSON only. Keep the \
         analysis concise but thorough."
    }

    pub fn summary_system_prompt() -> &'static str {
        "You are a legal consultant writing for decision-makers. Respond with valid JSON only."
    }

    pub fn build_analysis_prompt(
        text: &str,
        depth: AnalysisDepth,
        focus_areas: &[String],
    ) -> String {
        let categories = LegalCategory::focus_areas().collect::<Vec<_>>().join(", ");

        let mut prompt = format!(
            r#"LEGAL DOCUMENT ANALYSIS

DOCUMENT:
{}

ANALYSIS REQUIREMENTS:
- Identify specific legal issues, risks, and problematic clauses
- Categorize each issue into one of: {}, General
- Assess risk levels (High, Medium, Low) for each issue
- Provide confidence scores (0.0 to 1.0) for each identified issue
- Give specific recommendations for addressing each issue
- Consider potential legal implications and consequences

ANALYSIS DEPTH: {}
"#,
            Self::document_excerpt(text),
            categories,
            depth.as_str()
        );

        let focus: Vec<&str> = focus_areas
            .iter()
            .map(|area| area.trim())
            .filter(|area| !area.is_empty())
            .collect();
        if !focus.is_empty() {
            prompt.push_str(&format!(
                "\nFOCUS AREAS: Pay special attention to issues related to: {}\n",
                focus.join(", ")
            ));
        }

        prompt.push('\n');
        prompt.push_str(Self::depth_instructions(depth));
        prompt.push_str("\n\n");
        prompt.push_str(ANALYSIS_SCHEMA);
        prompt
    }

    pub fn depth_instructions(depth: AnalysisDepth) -> &'static str {
        match depth {
            AnalysisDepth::Comprehensive => {
                "Provide a thorough analysis including:
- Detailed examination of all clauses and terms
- Cross-referencing with relevant legal standards
- Potential edge cases and unusual scenarios
- Regulatory compliance considerations"
            }
            AnalysisDepth::Quick => {
                "Provide a focused analysis on:
- Most critical and obvious issues
- High-risk areas requiring immediate attention
- Major red flags and concerning clauses"
            }
            AnalysisDepth::Focused => {
                "Provide targeted analysis on:
- Issues specifically related to the selected focus areas
- Specialized legal concerns in those domains
- Industry-specific compliance requirements"
            }
        }
    }

    pub fn build_summary_prompt(
        analysis_json: &str,
        document_length: usize,
        issues_found: usize,
    ) -> String {
        let (context, truncated) = truncate_chars(analysis_json, MAX_SUMMARY_CONTEXT_CHARS);

        format!(
            r#"Legal consultant summary.

Analysis: {}{}

Document Length: {} characters
Issues Found: {}

Provide a JSON object with:
{{
    "executive_summary": "2-3 sentence summary of overall risk and the areas needing attention",
    "key_findings": ["5 most important findings"],
    "next_steps": ["5 recommended actions"]
}}"#,
            context,
            if truncated { "..." } else { "" },
            document_length,
            issues_found
        )
    }

    /// First [`MAX_EXCERPT_CHARS`] characters, with `...` appended when cut.
    pub fn document_excerpt(text: &str) -> String {
        let (excerpt, truncated) = truncate_chars(text, MAX_EXCERPT_CHARS);
        if truncated {
            format!("{}...", excerpt)
        } else {
            excerpt.to_string()
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}
