use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Immediate,
    High,
    Medium,
    Low,
}

/// Legal domain an issue is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegalCategory {
    #[serde(rename = "Contract Terms")]
    ContractTerms,
    Compliance,
    Liability,
    #[serde(rename = "Intellectual Property")]
    IntellectualProperty,
    #[serde(rename = "Employment Law")]
    EmploymentLaw,
    #[serde(rename = "Privacy & Data Protection")]
    PrivacyDataProtection,
    #[serde(rename = "Financial Terms")]
    FinancialTerms,
    #[serde(rename = "Dispute Resolution")]
    DisputeResolution,
    #[serde(rename = "Regulatory Requirements")]
    RegulatoryRequirements,
    #[serde(rename = "Risk Management")]
    RiskManagement,
    General,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub description: String,
    pub category: LegalCategory,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub potential_impact: String,
    pub recommendations: Vec<String>,
    pub legal_citation: String,
    pub urgency: Urgency,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(RiskLevel::High),
            "medium" => Some(RiskLevel::Medium),
            "low" => Some(RiskLevel::Low),
            _ => None,
        }
    }

    pub fn as_emoji(&self) -> &'static str {
        match self {
            RiskLevel::High => "🔴",
            RiskLevel::Medium => "🟡",
            RiskLevel::Low => "🟢",
        }
    }

    pub fn numeric_value(&self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Immediate => "Immediate",
            Urgency::High => "High",
            Urgency::Medium => "Medium",
            Urgency::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "immediate" => Some(Urgency::Immediate),
            "high" => Some(Urgency::High),
            "medium" => Some(Urgency::Medium),
            "low" => Some(Urgency::Low),
            _ => None,
        }
    }
}

impl LegalCategory {
    pub const ALL: [LegalCategory; 12] = [
        LegalCategory::ContractTerms,
        LegalCategory::Compliance,
        LegalCategory::Liability,
        LegalCategory::IntellectualProperty,
        LegalCategory::EmploymentLaw,
        LegalCategory::PrivacyDataProtection,
        LegalCategory::FinancialTerms,
        LegalCategory::DisputeResolution,
        LegalCategory::RegulatoryRequirements,
        LegalCategory::RiskManagement,
        LegalCategory::General,
        LegalCategory::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegalCategory::ContractTerms => "Contract Terms",
            LegalCategory::Compliance => "Compliance",
            LegalCategory::Liability => "Liability",
            LegalCategory::IntellectualProperty => "Intellectual Property",
            LegalCategory::EmploymentLaw => "Employment Law",
            LegalCategory::PrivacyDataProtection => "Privacy & Data Protection",
            LegalCategory::FinancialTerms => "Financial Terms",
            LegalCategory::DisputeResolution => "Dispute Resolution",
            LegalCategory::RegulatoryRequirements => "Regulatory Requirements",
            LegalCategory::RiskManagement => "Risk Management",
            LegalCategory::General => "General",
            LegalCategory::System => "System",
        }
    }

    /// Case-insensitive lookup by display name, plus the short forms models
    /// tend to emit ("IP", "Privacy", "Employment").
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        if let Some(category) = Self::ALL
            .iter()
            .find(|c| c.as_str().to_lowercase() == lower)
        {
            return Some(*category);
        }

        match lower.as_str() {
            "ip" | "intellectual property rights" => Some(LegalCategory::IntellectualProperty),
            "privacy" | "data protection" | "privacy and data protection" => {
                Some(LegalCategory::PrivacyDataProtection)
            }
            "employment" => Some(LegalCategory::EmploymentLaw),
            "contract" | "contractual terms" => Some(LegalCategory::ContractTerms),
            "financial" | "payment terms" => Some(LegalCategory::FinancialTerms),
            "dispute" | "disputes" | "arbitration" => Some(LegalCategory::DisputeResolution),
            "regulatory" | "regulation" => Some(LegalCategory::RegulatoryRequirements),
            "risk" => Some(LegalCategory::RiskManagement),
            _ => None,
        }
    }

    /// Categories a caller may pass as focus areas.
    pub fn focus_areas() -> impl Iterator<Item = &'static str> {
        Self::ALL[..10].iter().map(|c| c.as_str())
    }
}

impl Default for Issue {
    fn default() -> Self {
        Self {
            title: "Untitled Issue".to_string(),
            description: "No description provided".to_string(),
            category: LegalCategory::General,
            risk_level: RiskLevel::Medium,
            confidence: 0.5,
            potential_impact: "Impact assessment not provided".to_string(),
            recommendations: Vec::new(),
            legal_citation: String::new(),
            urgency: Urgency::Medium,
        }
    }
}

impl Issue {
    pub fn new<S: Into<String>>(title: S, category: LegalCategory, risk_level: RiskLevel) -> Self {
        Self {
            title: title.into(),
            category,
            risk_level,
            ..Default::default()
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_recommendation<S: Into<String>>(mut self, recommendation: S) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RiskLevel::High
    }
}
