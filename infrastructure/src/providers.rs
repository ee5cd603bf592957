use async_trait::async_trait;
use shared::types::Result;

/// Capability contract for turning text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Query-side embedding. Some providers embed queries differently from
    /// documents; the default reuses the document path. Either way the
    /// result must be dimensionally compatible with `embed`.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text).await
    }
}

/// Capability contract for synchronous prompt completion. No streaming.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
