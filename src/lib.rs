pub mod config;
pub mod embedding;
pub mod errors;
pub mod pipeline;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::embedding::providers::openai_compatible::OpenAiCompatibleProvider;
use crate::errors::{EmbedError, EmbedResult};
use crate::pipeline::{CsvPipeline, RunSummary};

/// Runs one enrichment pass with an already-built configuration.
pub async fn run_with_config(config: &AppConfig) -> EmbedResult<RunSummary> {
    let provider = OpenAiCompatibleProvider::from_config(&config.embedding)?;
    let mut pipeline = CsvPipeline::new(&config.pipeline, Arc::new(provider));
    pipeline.run().await
}

/// Process entry point: logging, `.env`, configuration, then one run.
/// Diagnostics go to stderr.
pub async fn run() -> EmbedResult<RunSummary> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = load_and_run().await;
    match &result {
        Ok(summary) => tracing::info!(
            rows = summary.rows,
            dimensions = summary.dimensions,
            output = %summary.output.display(),
            "Processing complete"
        ),
        Err(e) => tracing::error!(error = %e, "Error during processing"),
    }
    result
}

async fn load_and_run() -> EmbedResult<RunSummary> {
    load_dotenv()?;
    let cfg = config::load_config()?;
    run_with_config(&cfg).await
}

/// Loads `.env` from the program directory, else the working directory.
/// A missing file is not an error.
fn load_dotenv() -> EmbedResult<()> {
    let cwd = std::env::current_dir()?;
    if let Some(path) = config::resolve_dotenv_path(&config::program_dir()?, &cwd) {
        dotenvy::from_path(&path)
            .map_err(|e| EmbedError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), ".env loaded");
    }
    Ok(())
}
