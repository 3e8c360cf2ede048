use serde::{Deserialize, Serialize};

/// Instruction profile for the analysis prompt. Changes prompt content only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalysisDepth {
    #[default]
    Comprehensive,
    Quick,
    Focused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    pub depth: AnalysisDepth,
    pub focus_areas: Vec<String>,
    pub filename: String,
}

impl AnalysisDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisDepth::Comprehensive => "Comprehensive",
            AnalysisDepth::Quick => "Quick",
            AnalysisDepth::Focused => "Focused",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "comprehensive" | "full" => Some(AnalysisDepth::Comprehensive),
            "quick" => Some(AnalysisDepth::Quick),
            "focused" | "focus" => Some(AnalysisDepth::Focused),
            _ => None,
        }
    }
}

impl AnalysisRequest {
    pub fn new<T: Into<String>, F: Into<String>>(text: T, filename: F) -> Self {
        Self {
            text: text.into(),
            depth: AnalysisDepth::default(),
            focus_areas: Vec::new(),
            filename: filename.into(),
        }
    }

    pub fn with_depth(mut self, depth: AnalysisDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_focus_areas(mut self, focus_areas: Vec<String>) -> Self {
        self.focus_areas = focus_areas;
        self
    }

    pub fn document_length(&self) -> usize {
        self.text.chars().count()
    }
}
