use domain::models::{Chunk, Embedding};

pub struct SearchEngine;

impl SearchEngine {
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot_product / (norm_a * norm_b)
    }

    /// Up to `top_k` chunks ranked by similarity to the query, closest first.
    pub fn find_relevant_chunks(
        query_embedding: &[f32],
        embeddings: &[Embedding],
        top_k: usize,
    ) -> Vec<Chunk> {
        let mut similarities: Vec<(f32, &str)> = embeddings
            .iter()
            .map(|emb| {
                (
                    Self::cosine_similarity(query_embedding, &emb.vector),
                    emb.text.as_str(),
                )
            })
            .collect();

        similarities.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        similarities
            .into_iter()
            .take(top_k)
            .map(|(_, text)| Chunk::new(text))
            .collect()
    }
}
