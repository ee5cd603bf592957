use serde::{Deserialize, Serialize};

/// An indivisible unit of a user's source text, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
}

impl Chunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A chunk paired with its embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub text: String,
    pub vector: Vec<f32>,
}

/// Split source text on blank-line (paragraph) boundaries, trimming
/// whitespace and discarding empty results. A single-paragraph input
/// yields a single chunk.
pub fn chunk_text(text: &str) -> Vec<Chunk> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(Chunk::new)
        .collect()
}
