use std::path::PathBuf;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::embedding::provider::EmbeddingProvider;
use crate::errors::{EmbedError, EmbedResult};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::state::PipelineState;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    /// Length of the first row's vector.
    pub dimensions: usize,
    pub output: PathBuf,
}

/// Reads the input CSV, embeds every row in order, writes the output once.
///
/// Nothing is written unless every row was embedded; one request is in
/// flight at a time so output order equals input order.
pub struct CsvPipeline {
    config: PipelineConfig,
    provider: Arc<dyn EmbeddingProvider>,
    state: PipelineState,
}

impl CsvPipeline {
    pub fn new(config: &PipelineConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            config: config.clone(),
            provider,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub async fn run(&mut self) -> EmbedResult<RunSummary> {
        match self.execute().await {
            Ok(summary) => {
                self.transition(PipelineState::Done { rows: summary.rows });
                Ok(summary)
            }
            Err(e) => {
                self.transition(PipelineState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> EmbedResult<RunSummary> {
        self.transition(PipelineState::Reading);
        let delimiter = self.config.delimiter_byte()?;
        let mut dataset = self.read_dataset(delimiter).await?;

        let text_index = self.validate(&dataset)?;
        tracing::info!(provider = self.provider.name(), rows = dataset.len(), "embedding rows");
        self.transition(PipelineState::Enriching {
            completed: 0,
            total: dataset.len(),
        });
        self.enrich(&mut dataset, text_index).await?;

        self.transition(PipelineState::Writing {
            rows: dataset.len(),
        });
        self.write_dataset(&dataset, delimiter).await?;

        let dimensions = dataset
            .rows()
            .first()
            .and_then(|row| row.embedding())
            .map_or(0, <[f64]>::len);
        Ok(RunSummary {
            rows: dataset.len(),
            dimensions,
            output: self.config.output_path.clone(),
        })
    }

    async fn read_dataset(&self, delimiter: u8) -> EmbedResult<Dataset> {
        let path = &self.config.input_path;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| EmbedError::Read(format!("{}: {}", path.display(), e)))?;
        let dataset = Dataset::from_csv_reader(bytes.as_slice(), delimiter)
            .map_err(|e| match e {
                EmbedError::Read(msg) => EmbedError::Read(format!("{}: {}", path.display(), msg)),
                other => other,
            })?;

        if dataset.column_index(&self.config.embedding_column).is_some() {
            return Err(EmbedError::Read(format!(
                "{}: input already has a '{}' column",
                path.display(),
                self.config.embedding_column
            )));
        }
        if dataset.is_empty() {
            return Err(EmbedError::EmptyDataset(format!(
                "{} has a header but no data rows",
                path.display()
            )));
        }

        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            columns = dataset.headers().len(),
            "input loaded"
        );
        Ok(dataset)
    }

    /// Checks every row has text before any remote call is made.
    fn validate(&self, dataset: &Dataset) -> EmbedResult<usize> {
        let column = &self.config.text_column;
        let missing = |row: usize| EmbedError::MissingTextField {
            row,
            column: column.clone(),
        };

        let index = dataset.column_index(column).ok_or_else(|| missing(1))?;
        for (i, row) in dataset.rows().iter().enumerate() {
            match row.value(index) {
                Some(text) if !text.trim().is_empty() => {}
                _ => return Err(missing(i + 1)),
            }
        }
        Ok(index)
    }

    async fn enrich(&mut self, dataset: &mut Dataset, text_index: usize) -> EmbedResult<()> {
        let total = dataset.len();
        for (i, row) in dataset.rows_mut().iter_mut().enumerate() {
            let text = row.value(text_index).unwrap_or_default();
            let embedding = self.provider.embed(text).await?;
            tracing::debug!(
                row = i + 1,
                total,
                dimensions = embedding.len(),
                "row embedded"
            );
            row.attach_embedding(embedding);
            self.state = PipelineState::Enriching {
                completed: i + 1,
                total,
            };
        }
        Ok(())
    }

    async fn write_dataset(&self, dataset: &Dataset, delimiter: u8) -> EmbedResult<()> {
        let path = &self.config.output_path;
        let bytes = dataset.to_csv_bytes(&self.config.embedding_column, delimiter)?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| EmbedError::Write(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "output written");
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) {
        match &next {
            PipelineState::Failed(reason) => {
                tracing::warn!(from = ?self.state, reason = %reason, "pipeline failed");
            }
            _ => tracing::info!(from = ?self.state, to = ?next, "pipeline state changed"),
        }
        self.state = next;
    }
}
