//! Test doubles and fixtures shared by the integration tests.

use async_trait::async_trait;
use infrastructure::providers::{EmbeddingProvider, LanguageModel};
use shared::types::{CoreError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Language model that replays a fixed script of completions and records
/// every prompt it was given.
pub struct ScriptedModel {
    responses: Mutex<Vec<String>>,
    pub prompts_seen: Mutex<Vec<String>>,
    /// Errors to inject before the scripted responses start succeeding.
    failures_remaining: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(responses: &[&str]) -> Self {
        let mut queue: Vec<String> = responses.iter().map(|s| s.to_string()).collect();
        queue.reverse();
        Self {
            responses: Mutex::new(queue),
            prompts_seen: Mutex::new(Vec::new()),
            failures_remaining: AtomicUsize::new(0),
        }
    }

    pub fn failing_first(failures: usize, responses: &[&str]) -> Self {
        let model = Self::new(responses);
        model.failures_remaining.store(failures, Ordering::SeqCst);
        model
    }

    pub fn calls(&self) -> usize {
        self.prompts_seen.lock().unwrap().len()
    }

    pub fn prompt(&self, idx: usize) -> String {
        self.prompts_seen.lock().unwrap()[idx].clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts_seen.lock().unwrap().push(prompt.to_string());
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(CoreError::Upstream("scripted failure".to_string()));
        }
        Ok(self.responses.lock().unwrap().pop().unwrap_or_default())
    }
}

/// Deterministic embedding provider: a letter-frequency histogram, so
/// identical text always yields the identical vector and lexically similar
/// text lands nearby.
pub struct HistogramEmbedder;

#[async_trait]
impl EmbeddingProvider for HistogramEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; 26];
        for c in text.to_lowercase().chars() {
            if c.is_ascii_lowercase() {
                vector[(c as u8 - b'a') as usize] += 1.0;
            }
        }
        Ok(vector)
    }
}

/// Writes the full prompt template set into a scratch directory.
pub fn write_prompt_fixtures(dir: &std::path::Path) {
    std::fs::write(
        dir.join("chatbot-query-analyzer-prompt.md"),
        "INTENT history={chat_history} question={current_question}\n",
    )
    .unwrap();
    for file in [
        "chatbot-rag-prompt.md",
        "manufacturing-rag-prompt.md",
        "finance-rag-prompt.md",
        "real-estate-rag-prompt.md",
    ] {
        std::fs::write(
            dir.join(file),
            format!("RAG({file}) context={{context}} history={{chat_history}} question={{current_question}}\n"),
        )
        .unwrap();
    }
}
