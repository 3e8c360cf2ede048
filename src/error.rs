use thiserror::Error;

/// Retry classification of a failed provider call.
///
/// Assigned where the error is created (adapter or normalizer), never
/// recovered later from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    MalformedResponse,
    Fatal,
}

#[derive(Error, Debug)]
pub enum LegalMindError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported model '{0}'. Use OpenAI (gpt-*), Anthropic (claude-*), or Gemini (gemini-*) models")]
    UnsupportedModel(String),

    #[error("Rate limited by {provider}: {message}")]
    RateLimited { provider: String, message: String },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("{provider} API error ({status}): {message}")]
    Provider {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Analysis timeout after {timeout} seconds")]
    AnalysisTimeout { timeout: u64 },

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Document too short for analysis: {length} characters (minimum {minimum})")]
    DocumentTooShort { length: usize, minimum: usize },

    #[error("Invalid command line arguments: {0}")]
    InvalidArguments(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LegalMindError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LegalMindError::RateLimited { .. } => FailureKind::RateLimited,
            LegalMindError::MalformedResponse(_) => FailureKind::MalformedResponse,
            _ => FailureKind::Fatal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() != FailureKind::Fatal
    }

    /// Process exit code used by the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            LegalMindError::InvalidArguments(_) => 2,
            LegalMindError::Extraction(_) | LegalMindError::DocumentTooShort { .. } => 3,
            LegalMindError::AnalysisTimeout { .. } => 4,
            LegalMindError::Provider { .. }
            | LegalMindError::Network(_)
            | LegalMindError::RateLimited { .. }
            | LegalMindError::MalformedResponse(_) => 5,
            LegalMindError::Configuration(_) | LegalMindError::UnsupportedModel(_) => 6,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, LegalMindError>;
