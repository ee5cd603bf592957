use crate::embedder::Embedder;
use crate::providers::EmbeddingProvider;
use crate::search::SearchEngine;
use crate::store::StoreRegistry;
use domain::models::{Chunk, Embedding};
use domain::organization::Organization;
use serde::{Deserialize, Serialize};
use shared::types::{CoreError, Result};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_TOP_K: usize = 3;

const INDEX_FORMAT_VERSION: u32 = 1;

/// On-blob index record. Explicit and versioned so any reader can interpret
/// it without an opaque object-serialization format.
#[derive(Serialize, Deserialize)]
struct StoredIndex {
    version: u32,
    dimension: usize,
    metric: String,
    entries: Vec<Embedding>,
}

fn index_key(username: &str) -> String {
    format!("{username}_embeddings")
}

/// Per-user, per-organization persisted similarity index over text chunks.
pub struct VectorIndexStore {
    registry: Arc<StoreRegistry>,
    provider: Arc<dyn EmbeddingProvider>,
    embedder: Embedder,
}

impl VectorIndexStore {
    pub fn new(registry: Arc<StoreRegistry>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let embedder = Embedder::new(provider.clone());
        Self {
            registry,
            provider,
            embedder,
        }
    }

    /// Embeds every chunk and persists a fresh index for (user, organization).
    /// An empty chunk set is a validation error.
    pub async fn build(
        &self,
        username: &str,
        organization: Organization,
        chunks: &[Chunk],
    ) -> Result<()> {
        if chunks.is_empty() {
            return Err(CoreError::Validation("text is required".to_string()));
        }
        let entries = self.embedder.embed_chunks(chunks).await?;
        let dimension = entries.first().map(|e| e.vector.len()).unwrap_or(0);
        let index = StoredIndex {
            version: INDEX_FORMAT_VERSION,
            dimension,
            metric: "cosine".to_string(),
            entries,
        };
        let data = serde_json::to_vec(&index)?;
        self.registry
            .store(organization)
            .put_blob(&index_key(username), &data)?;
        info!(user = username, org = %organization, chunks = chunks.len(), "vector index built");
        Ok(())
    }

    /// Nearest-neighbor lookup, closest first, at most `k` chunks. A missing
    /// index is the normal "no knowledge yet" condition and yields an empty
    /// result rather than an error.
    pub async fn query(
        &self,
        username: &str,
        organization: Organization,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<Chunk>> {
        let store = self.registry.store(organization);
        let Some(data) = store.get_blob(&index_key(username))? else {
            return Ok(Vec::new());
        };
        let index: StoredIndex = serde_json::from_slice(&data)?;
        if index.version != INDEX_FORMAT_VERSION {
            return Err(CoreError::Storage(format!(
                "unsupported index version {} for user {username}",
                index.version
            )));
        }
        let query_embedding = self.provider.embed_query(query_text).await?;
        if query_embedding.len() != index.dimension {
            return Err(CoreError::Storage(format!(
                "index for user {username} has dimension {} but the query embedding has {}",
                index.dimension,
                query_embedding.len()
            )));
        }
        Ok(SearchEngine::find_relevant_chunks(
            &query_embedding,
            &index.entries,
            k,
        ))
    }

    /// Deletes the existing index, then rebuilds from `chunks`. Fails with
    /// NotFound when no index exists. This is a non-atomic two-step: a crash
    /// after the delete and before the build leaves the user with no index.
    pub async fn replace(
        &self,
        username: &str,
        organization: Organization,
        chunks: &[Chunk],
    ) -> Result<()> {
        let store = self.registry.store(organization);
        if !store.delete_blob(&index_key(username))? {
            return Err(CoreError::NotFound(format!(
                "no index for user {username}"
            )));
        }
        self.build(username, organization, chunks).await
    }

    /// Removes a user's index if present; absent is fine (used on user delete).
    pub fn remove(&self, username: &str, organization: Organization) -> Result<()> {
        self.registry
            .store(organization)
            .delete_blob(&index_key(username))?;
        Ok(())
    }
}
