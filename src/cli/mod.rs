pub mod args;
pub mod reporter;

pub use args::{Cli, Command, OutputFormat};
pub use reporter::ReportFormatter;

use crate::analyzer::{AnalysisOrchestrator, ModelComparator, ProviderRegistry};
use crate::cli::args::{AnalyzeArgs, CompareArgs, DocumentArgs};
use crate::document::{
    document_stats, ensure_minimum_length, mime_for_path, DocumentExtractor, DocumentStats,
};
use crate::error::LegalMindError;
use crate::models::AnalysisRequest;
use std::time::Duration;

pub struct CliHandler {
    cli: Cli,
    registry: Option<ProviderRegistry>,
}

impl CliHandler {
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            registry: None,
        }
    }

    /// Uses `registry` instead of building provider clients from the environment.
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Runs the selected subcommand and writes its report to stdout.
    pub async fn run(&self) -> Result<i32, LegalMindError> {
        let output = self.render().await?;
        println!("{}", output);
        Ok(0)
    }

    /// Runs the selected subcommand and returns the rendered report.
    pub async fn render(&self) -> Result<String, LegalMindError> {
        let formatter = ReportFormatter::for_cli(&self.cli);

        match &self.cli.command {
            Command::Models => formatter.format_models(&self.registry()?),
            Command::Analyze(args) => self.analyze(args, &formatter).await,
            Command::Compare(args) => self.compare(args, &formatter).await,
        }
    }

    async fn analyze(
        &self,
        args: &AnalyzeArgs,
        formatter: &ReportFormatter,
    ) -> Result<String, LegalMindError> {
        let (request, stats) = self.load_document(&args.document)?;
        let orchestrator = self.orchestrator(&args.document)?;

        let report = orchestrator.analyze(&request, &args.model).await?;
        formatter.format_analysis_report(&report, Some(&stats))
    }

    async fn compare(
        &self,
        args: &CompareArgs,
        formatter: &ReportFormatter,
    ) -> Result<String, LegalMindError> {
        let (request, _) = self.load_document(&args.document)?;
        let comparator = ModelComparator::new(self.orchestrator(&args.document)?)
            .with_max_concurrent(args.concurrency as usize);

        let comparison = comparator.compare(&request, &args.models).await;
        formatter.format_comparison_report(&comparison)
    }

    /// Extracts and length-checks the document. No provider is touched here.
    fn load_document(
        &self,
        args: &DocumentArgs,
    ) -> Result<(AnalysisRequest, DocumentStats), LegalMindError> {
        let mime = mime_for_path(&args.file).ok_or_else(|| {
            LegalMindError::Extraction(format!(
                "unsupported file type: {} (expected .pdf, .docx or .txt)",
                args.file.display()
            ))
        })?;

        let text = DocumentExtractor::extract(&args.file, mime)?;
        ensure_minimum_length(&text)?;

        let stats = document_stats(&text);
        tracing::debug!(
            "Document statistics: {} characters, {} words, {} sentences, {} paragraphs",
            stats.character_count,
            stats.word_count,
            stats.sentence_count,
            stats.paragraph_count
        );

        let filename = args
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.file.display().to_string());

        let request = AnalysisRequest::new(text, filename)
            .with_depth(args.depth)
            .with_focus_areas(args.focus_areas.clone());
        Ok((request, stats))
    }

    fn registry(&self) -> Result<ProviderRegistry, LegalMindError> {
        match &self.registry {
            Some(registry) => Ok(registry.clone()),
            None => ProviderRegistry::from_env(self.cli.timeout),
        }
    }

    fn orchestrator(&self, args: &DocumentArgs) -> Result<AnalysisOrchestrator, LegalMindError> {
        let orchestrator = AnalysisOrchestrator::new(self.registry()?);
        Ok(match args.deadline {
            Some(seconds) => orchestrator.with_deadline(Duration::from_secs(seconds)),
            None => orchestrator,
        })
    }
}
