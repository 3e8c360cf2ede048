use crate::analyzer::DEFAULT_MODEL;
use crate::error::LegalMindError;
use crate::models::{AnalysisDepth, LegalCategory};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "legalmind")]
#[command(about = "AI-assisted legal document analysis across multiple LLM providers")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Per-request HTTP timeout in seconds (10-300)
    #[arg(short = 't', long, default_value = "120", value_parser = validate_timeout, global = true)]
    pub timeout: u64,

    /// Report format written to stdout
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Enable debug logging and document statistics
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a document with one model
    Analyze(AnalyzeArgs),
    /// Analyze a document with several models and compare the results
    Compare(CompareArgs),
    /// List known models and whether their provider is configured
    Models,
}

#[derive(Args, Debug)]
pub struct DocumentArgs {
    /// Document to analyze (.pdf, .docx or .txt)
    pub file: PathBuf,

    /// Analysis depth: comprehensive, quick or focused
    #[arg(short = 'd', long, default_value = "comprehensive", value_parser = parse_depth)]
    pub depth: AnalysisDepth,

    /// Legal area to emphasise; may be repeated
    #[arg(long = "focus", value_parser = parse_focus_area)]
    pub focus_areas: Vec<String>,

    /// Overall limit for one analysis in seconds, retry waits included
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub deadline: Option<u64>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Model identifier
    #[arg(short = 'm', long, env = "LEGALMIND_DEFAULT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Comma-separated model identifiers
    #[arg(short = 'm', long, value_delimiter = ',', required = true, num_args = 1..)]
    pub models: Vec<String>,

    /// Models analyzed at the same time
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..=8))]
    pub concurrency: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub fn parse_args() -> Result<Self, LegalMindError> {
        let cli = Self::try_parse().map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => LegalMindError::InvalidArguments(e.to_string()),
        })?;
        cli.validate()?;
        Ok(cli)
    }

    pub fn validate(&self) -> Result<(), LegalMindError> {
        if !(10..=300).contains(&self.timeout) {
            return Err(LegalMindError::InvalidArguments(
                "Timeout must be between 10 and 300 seconds".to_string(),
            ));
        }

        if let Command::Compare(args) = &self.command {
            if args.models.iter().all(|m| m.trim().is_empty()) {
                return Err(LegalMindError::InvalidArguments(
                    "At least one model is required for comparison".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn document(&self) -> Option<&DocumentArgs> {
        match &self.command {
            Command::Analyze(args) => Some(&args.document),
            Command::Compare(args) => Some(&args.document),
            Command::Models => None,
        }
    }

    /// Log filter directive used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "warn,legalmind=debug"
        } else {
            "warn,legalmind=info"
        }
    }
}

fn validate_timeout(s: &str) -> Result<u64, String> {
    let timeout: u64 = s.parse().map_err(|_| "Timeout must be a number")?;

    if (10..=300).contains(&timeout) {
        Ok(timeout)
    } else {
        Err("Timeout must be between 10 and 300 seconds".to_string())
    }
}

fn parse_depth(s: &str) -> Result<AnalysisDepth, String> {
    AnalysisDepth::from_str(s)
        .ok_or_else(|| format!("Unknown depth '{}'. Use comprehensive, quick or focused", s))
}

fn parse_focus_area(s: &str) -> Result<String, String> {
    LegalCategory::from_str(s)
        .map(|category| category.as_str().to_string())
        .ok_or_else(|| {
            format!(
                "Unknown focus area '{}'. Known areas: {}",
                s,
                LegalCategory::focus_areas().collect::<Vec<_>>().join(", ")
            )
        })
}
