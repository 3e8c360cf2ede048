use clap::Parser;
use legalmind::analyzer::{
    GenerationRequest, LlmProvider, ProviderKind, ProviderRegistry, ProviderResponse,
};
use legalmind::cli::{Cli, CliHandler, Command, OutputFormat};
use legalmind::error::LegalMindError;
use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Provider that records calls and always returns an empty analysis.
#[derive(Default)]
struct CountingProvider {
    calls: AtomicUsize,
}

impl LlmProvider for CountingProvider {
    fn generate<'a>(
        &'a self,
        _request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderResponse, LegalMindError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async {
            Ok(ProviderResponse {
                text: r#"{"issues": [], "overall_risk_score": 1, "document_type": "Letter"}"#
                    .to_string(),
                usage: None,
            })
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }
}

fn document(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn handler(args: &[&str], provider: Arc<CountingProvider>) -> CliHandler {
    let cli = Cli::try_parse_from(args).unwrap();
    CliHandler::new(cli).with_registry(ProviderRegistry::new().with_provider(provider))
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "legalmind",
        "analyze",
        "contract.txt",
        "--model",
        "claude-3-5-haiku-latest",
        "--format",
        "json",
        "--timeout",
        "45",
        "--deadline",
        "600",
        "-v",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Json);
    assert_eq!(cli.timeout, 45);
    assert!(cli.verbose);
    match &cli.command {
        Command::Analyze(args) => {
            assert_eq!(args.model, "claude-3-5-haiku-latest");
            assert_eq!(args.document.deadline, Some(600));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_invalid_depth_is_rejected() {
    assert!(Cli::try_parse_from(["legalmind", "analyze", "a.txt", "--depth", "deep"]).is_err());
}

#[test]
fn test_zero_deadline_is_rejected() {
    assert!(Cli::try_parse_from(["legalmind", "analyze", "a.txt", "--deadline", "0"]).is_err());
}

#[tokio::test]
async fn test_short_document_is_rejected_before_any_provider_call() {
    let text = "x".repeat(40);
    let file = document(&text, ".txt");
    let provider = Arc::new(CountingProvider::default());

    let path = file.path().to_str().unwrap();
    let err = handler(
        &["legalmind", "analyze", path, "--model", "gemini-2.0-flash"],
        provider.clone(),
    )
    .render()
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        LegalMindError::DocumentTooShort {
            length: 40,
            minimum: 50
        }
    ));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unsupported_extension_is_an_extraction_error() {
    let file = document(&"y".repeat(200), ".png");
    let provider = Arc::new(CountingProvider::default());

    let path = file.path().to_str().unwrap();
    let err = handler(&["legalmind", "analyze", path], provider.clone())
        .render()
        .await
        .unwrap_err();

    assert!(matches!(err, LegalMindError::Extraction(_)));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_json_output_is_a_report() {
    let file = document(
        "This Non-Disclosure Agreement is entered into by Acme Corp and Beta LLC. \
         The Receiving Party shall keep all Confidential Information secret.",
        ".txt",
    );
    let provider = Arc::new(CountingProvider::default());

    let path = file.path().to_str().unwrap();
    let output = handler(
        &[
            "legalmind",
            "analyze",
            path,
            "--model",
            "gemini-2.0-flash",
            "--format",
            "json",
        ],
        provider.clone(),
    )
    .render()
    .await
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["document_type"], "Letter");
    assert_eq!(json["analysis_metadata"]["model_used"], "gemini-2.0-flash");
    assert_eq!(json["performance_metrics"]["issues_found"], 0);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_models_command_lists_configuration_state() {
    let provider = Arc::new(CountingProvider::default());
    let output = handler(&["legalmind", "models", "--format", "json"], provider)
        .render()
        .await
        .unwrap();

    let models: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();
    let gemini = models
        .iter()
        .find(|m| m["id"] == "gemini-2.0-flash-lite")
        .unwrap();
    assert_eq!(gemini["configured"], true);

    let gpt = models.iter().find(|m| m["id"] == "gpt-4o-mini").unwrap();
    assert_eq!(gpt["configured"], false);
}
