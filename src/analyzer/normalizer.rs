//! Turns raw model output into validated analysis structures.
//!
//! Parsing is two-stage: a fenced code-block wrapper is stripped, then the
//! remainder must parse as a JSON object or the call fails with
//! [`LegalMindError::MalformedResponse`]. Once parsed, every field is
//! backfilled and clamped so the result always satisfies the report schema.

use crate::error::LegalMindError;
use crate::models::{ExecutiveSummary, Issue, LegalCategory, NormalizedAnalysis, RiskLevel, Urgency};
use serde_json::{Map, Value};

const DEFAULT_CONFIDENCE: f64 = 0.5;
const DEFAULT_RISK_SCORE: f64 = 5.0;
const MAX_RISK_SCORE: f64 = 10.0;

/// Removes a leading ```` ```json ```` / ```` ``` ```` line and a trailing ```` ``` ````.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json", "JSON", ...) on the opening line.
    let body = match after_open.find('\n') {
        Some(newline) => &after_open[newline + 1..],
        None => after_open.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

pub fn parse_json_object(raw: &str) -> Result<Map<String, Value>, LegalMindError> {
    let payload = strip_code_fence(raw);

    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(LegalMindError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(LegalMindError::MalformedResponse(format!(
            "model output is not valid JSON: {}",
            e
        ))),
    }
}

pub fn normalize_analysis(raw: &str) -> Result<NormalizedAnalysis, LegalMindError> {
    let map = parse_json_object(raw)?;
    Ok(normalize_analysis_map(&map))
}

pub fn normalize_analysis_map(map: &Map<String, Value>) -> NormalizedAnalysis {
    let issues = match map.get("issues") {
        Some(Value::Array(entries)) => entries.iter().filter_map(normalize_issue).collect(),
        _ => Vec::new(),
    };

    let overall_risk_score = map
        .get("overall_risk_score")
        .and_then(number_value)
        .unwrap_or(DEFAULT_RISK_SCORE)
        .clamp(0.0, MAX_RISK_SCORE);

    NormalizedAnalysis {
        issues,
        overall_risk_score,
        document_type: text_value(map.get("document_type")).unwrap_or_else(|| "Unknown".to_string()),
        compliance_flags: string_list(map.get("compliance_flags")),
        positive_aspects: string_list(map.get("positive_aspects")),
    }
}

/// Validates one entry of the `issues` array. Non-object entries are dropped.
pub fn normalize_issue(value: &Value) -> Option<Issue> {
    let Value::Object(fields) = value else {
        tracing::debug!("Dropping non-object issue entry: {}", json_type_name(value));
        return None;
    };

    let defaults = Issue::default();

    let category = text_value(fields.get("category"))
        .and_then(|c| LegalCategory::from_str(&c))
        .unwrap_or(defaults.category);

    let risk_level = text_value(fields.get("risk_level"))
        .and_then(|r| RiskLevel::from_str(&r))
        .unwrap_or(defaults.risk_level);

    let urgency = text_value(fields.get("urgency"))
        .and_then(|u| Urgency::from_str(&u))
        .unwrap_or(defaults.urgency);

    let confidence = fields
        .get("confidence")
        .and_then(number_value)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    Some(Issue {
        title: text_value(fields.get("title")).unwrap_or(defaults.title),
        description: text_value(fields.get("description")).unwrap_or(defaults.description),
        category,
        risk_level,
        confidence,
        potential_impact: text_value(fields.get("potential_impact"))
            .unwrap_or(defaults.potential_impact),
        recommendations: string_list(fields.get("recommendations")),
        legal_citation: text_value(fields.get("legal_citation")).unwrap_or_default(),
        urgency,
    })
}

pub fn normalize_summary(raw: &str) -> Result<ExecutiveSummary, LegalMindError> {
    let map = parse_json_object(raw)?;

    Ok(ExecutiveSummary {
        executive_summary: text_value(map.get("executive_summary")).unwrap_or_default(),
        key_findings: string_list(map.get("key_findings")),
        next_steps: string_list(map.get("next_steps")),
    })
}

fn text_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;

    number.is_finite().then_some(number)
}

/// Sequence coercion: arrays keep their scalar entries, a bare scalar becomes
/// a one-element sequence, null or missing becomes empty.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
        Some(Value::String(s)) => vec![s.clone()],
        Some(other) => vec![other.to_string()],
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
