use std::time::Duration;

use async_trait::async_trait;

use crate::config::{EmbeddingConfig, API_KEY_ENV};
use crate::embedding::provider::EmbeddingProvider;
use crate::embedding::types::{Embedding, EmbeddingRequest, EmbeddingResponse, ENCODING_FORMAT};
use crate::errors::{EmbedError, EmbedResult};

pub struct OpenAiCompatibleProvider {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimensions: Option<usize>,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        api_base: &str,
        api_key: Option<String>,
        model: String,
        dimensions: Option<usize>,
        timeout: Duration,
    ) -> EmbedResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: format!("{}/embeddings", api_base.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            dimensions,
            client,
        })
    }

    pub fn from_config(cfg: &EmbeddingConfig) -> EmbedResult<Self> {
        Self::new(
            &cfg.api_base,
            cfg.api_key.clone(),
            cfg.model.clone(),
            cfg.dimensions,
            Duration::from_secs(cfg.timeout_secs.max(1)),
        )
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> EmbedResult<Embedding> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(EmbedError::RemoteCall(format!(
                "no API key configured (set {API_KEY_ENV})"
            )));
        };

        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
            encoding_format: ENCODING_FORMAT,
            dimensions: self.dimensions,
        };

        tracing::debug!(
            model = %self.model,
            text_len = text.len(),
            "sending embedding request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbedError::RemoteCall(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(EmbedError::RemoteCall(format!("{}: {}", status, err_body)));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::RemoteCall(format!("invalid embedding response: {e}")))?;

        if let Some(usage) = &parsed.usage {
            tracing::trace!(
                prompt_tokens = usage.prompt_tokens,
                total_tokens = usage.total_tokens,
                "embedding usage"
            );
        }

        let embedding = parsed
            .data
            .into_iter()
            .min_by_key(|entry| entry.index)
            .map(|entry| entry.embedding)
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| {
                EmbedError::RemoteCall("embedding response contained no vector".to_string())
            })?;

        tracing::debug!(
            model = parsed.model.as_deref().unwrap_or(&self.model),
            dimensions = embedding.len(),
            "embedding received"
        );
        Ok(embedding)
    }
}
