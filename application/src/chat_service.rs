use crate::agent::AgentPipeline;
use domain::conversation::{ChatTurn, ConversationState, Message};
use domain::organization::Organization;
use infrastructure::prompt_store::PromptStore;
use infrastructure::providers::LanguageModel;
use infrastructure::vector_index::VectorIndexStore;
use shared::telemetry::Telemetry;
use shared::types::{CoreError, Result};
use std::sync::Arc;
use tracing::info;

/// Converts a raw chat-turn history into pipeline input, runs the agent once
/// per user message, and returns the final answer.
pub struct ChatService {
    llm: Arc<dyn LanguageModel>,
    prompts: Arc<PromptStore>,
    index: Arc<VectorIndexStore>,
}

impl ChatService {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        prompts: Arc<PromptStore>,
        index: Arc<VectorIndexStore>,
    ) -> Self {
        Self {
            llm,
            prompts,
            index,
        }
    }

    /// The last element's question becomes the current question; all earlier
    /// elements become prior turns, order preserved, with an assistant
    /// message only for turns that already have an answer.
    pub async fn answer(
        &self,
        username: &str,
        organization: Organization,
        chat_history: &[ChatTurn],
    ) -> Result<String> {
        let Some((last, earlier)) = chat_history.split_last() else {
            return Err(CoreError::Validation(
                "chat history is required".to_string(),
            ));
        };

        let mut messages = Vec::with_capacity(earlier.len() * 2);
        for turn in earlier {
            messages.push(Message::user(&turn.question));
            if !turn.answer.is_empty() {
                messages.push(Message::assistant(&turn.answer));
            }
        }

        let timer = Telemetry::new();
        let mut state =
            ConversationState::new(&last.question, messages, username, organization);
        AgentPipeline::new(self.llm.as_ref(), &self.prompts, &self.index)
            .run(&mut state)
            .await?;
        info!(
            user = username,
            org = %organization,
            greeting = state.greeting,
            elapsed_ms = timer.elapsed_ms() as u64,
            "chat turn answered"
        );
        Ok(state.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use infrastructure::providers::EmbeddingProvider;
    use infrastructure::store::StoreRegistry;
    use std::sync::Mutex;

    struct EchoModel {
        prompts_seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts_seen.lock().unwrap().push(prompt.to_string());
            // Always a greeting so the pipeline ends after one call.
            Ok("<response>ok</response><greeting>true</greeting>".to_string())
        }
    }

    struct ZeroEmbedder;

    #[async_trait]
    impl EmbeddingProvider for ZeroEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.0; 4])
        }
    }

    fn service() -> (Arc<EchoModel>, ChatService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("chatbot-query-analyzer-prompt.md"),
            "history={chat_history} question={current_question}\n",
        )
        .unwrap();
        let llm = Arc::new(EchoModel {
            prompts_seen: Mutex::new(Vec::new()),
        });
        let registry = Arc::new(StoreRegistry::open_in_memory().unwrap());
        let index = Arc::new(VectorIndexStore::new(registry, Arc::new(ZeroEmbedder)));
        let prompts = Arc::new(PromptStore::new(dir.path()));
        let service = ChatService::new(llm.clone(), prompts, index);
        (llm, service, dir)
    }

    #[tokio::test]
    async fn empty_history_is_a_validation_error() {
        let (_llm, service, _dir) = service();
        let err = service
            .answer("alice", Organization::General, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn last_question_drives_the_turn_and_earlier_turns_become_history() {
        let (llm, service, _dir) = service();
        let history = vec![
            ChatTurn::new("What city?", "Paris"),
            ChatTurn::new("And the population?", ""),
        ];
        let answer = service
            .answer("alice", Organization::General, &history)
            .await
            .unwrap();
        assert_eq!(answer, "ok");

        let prompt = llm.prompts_seen.lock().unwrap()[0].clone();
        assert!(prompt.contains("question=And the population?"));
        assert!(prompt.contains("User: What city?\nAssistant: Paris"));
    }

    #[tokio::test]
    async fn unanswered_prior_turns_have_no_assistant_line() {
        let (llm, service, _dir) = service();
        let history = vec![
            ChatTurn::new("First question", ""),
            ChatTurn::new("Second question", ""),
        ];
        service
            .answer("alice", Organization::General, &history)
            .await
            .unwrap();

        let prompt = llm.prompts_seen.lock().unwrap()[0].clone();
        assert!(prompt.contains("User: First question"));
        assert!(!prompt.contains("Assistant:"));
    }
}
