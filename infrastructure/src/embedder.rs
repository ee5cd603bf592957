use crate::providers::EmbeddingProvider;
use domain::models::{Chunk, Embedding};
use futures::stream::{self, StreamExt};
use shared::types::Result;
use std::sync::Arc;
use tracing::debug;

const BATCH_SIZE: usize = 32;
const CONCURRENCY: usize = 8;

/// Embeds chunk batches through the injected provider with bounded
/// concurrency, preserving chunk order.
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(BATCH_SIZE) {
            debug!(count = batch.len(), "generating embeddings for batch");
            let batch_embeddings = self.embed_batch(batch).await?;
            embeddings.extend(batch_embeddings);
        }
        Ok(embeddings)
    }

    async fn embed_batch(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>> {
        let futures: Vec<_> = chunks
            .iter()
            .map(|chunk| {
                let provider = &self.provider;
                async move {
                    let vector = provider.embed(&chunk.text).await?;
                    Ok(Embedding {
                        text: chunk.text.clone(),
                        vector,
                    }) as Result<Embedding>
                }
            })
            .collect();

        let results = stream::iter(futures)
            .buffered(CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        results.into_iter().collect()
    }
}
