use async_trait::async_trait;

use crate::embedding::types::Embedding;
use crate::errors::EmbedResult;

/// Remote text-to-vector capability used by the pipeline.
/// One call embeds one text; implementations must not batch or retry.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier for logs (model name for remote providers).
    fn name(&self) -> &str;

    /// Returns the embedding of `text`, or `EmbedError::RemoteCall`.
    async fn embed(&self, text: &str) -> EmbedResult<Embedding>;
}
