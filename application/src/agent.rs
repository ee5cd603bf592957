use crate::response_parser::{parse_answer, parse_intent};
use domain::conversation::ConversationState;
use domain::organization::PromptKind;
use infrastructure::prompt_store::{render, PromptStore};
use infrastructure::providers::LanguageModel;
use infrastructure::vector_index::{VectorIndexStore, DEFAULT_TOP_K};
use shared::types::Result;
use tracing::debug;

/// Pipeline position. Two nodes plus the terminal state: intent
/// classification always runs first and retrieval-augmented generation runs
/// only when the turn was not classified as a greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    IntentClassification,
    RetrievalAugmentedGeneration,
    End,
}

/// The two-node conversational agent. One invocation owns one
/// `ConversationState`; failures from the model or template resolution
/// propagate unmodified, with no retry and no fallback answer.
pub struct AgentPipeline<'a> {
    llm: &'a dyn LanguageModel,
    prompts: &'a PromptStore,
    index: &'a VectorIndexStore,
}

impl<'a> AgentPipeline<'a> {
    pub fn new(
        llm: &'a dyn LanguageModel,
        prompts: &'a PromptStore,
        index: &'a VectorIndexStore,
    ) -> Self {
        Self {
            llm,
            prompts,
            index,
        }
    }

    /// Runs the state machine to completion. The final answer is left in
    /// `state.answer`.
    pub async fn run(&self, state: &mut ConversationState) -> Result<()> {
        let mut step = Step::IntentClassification;
        loop {
            step = match step {
                Step::IntentClassification => {
                    self.classify_intent(state).await?;
                    if state.greeting {
                        Step::End
                    } else {
                        Step::RetrievalAugmentedGeneration
                    }
                }
                Step::RetrievalAugmentedGeneration => {
                    self.generate_answer(state).await?;
                    Step::End
                }
                Step::End => break,
            };
        }
        Ok(())
    }

    async fn classify_intent(&self, state: &mut ConversationState) -> Result<()> {
        let template = self
            .prompts
            .resolve(PromptKind::IntentClassifier, state.organization)?;
        let prompt = render(
            &template,
            &[
                ("chat_history", state.chat_history().as_str()),
                ("current_question", state.current_question.as_str()),
            ],
        );
        let raw = self.llm.complete(&prompt).await?;
        let outcome = parse_intent(&raw);
        debug!(greeting = outcome.is_greeting, "intent classified");
        state.answer = outcome.answer;
        state.greeting = outcome.is_greeting;
        state.standalone_question = outcome.standalone_question;
        Ok(())
    }

    async fn generate_answer(&self, state: &mut ConversationState) -> Result<()> {
        let chunks = self
            .index
            .query(
                &state.username,
                state.organization,
                &state.current_question,
                DEFAULT_TOP_K,
            )
            .await?;
        let context = if chunks.is_empty() {
            "Empty".to_string()
        } else {
            chunks
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        };
        let template = self
            .prompts
            .resolve(PromptKind::RagAnswer, state.organization)?;
        let prompt = render(
            &template,
            &[
                ("context", context.as_str()),
                ("chat_history", state.chat_history().as_str()),
                ("current_question", state.current_question.as_str()),
            ],
        );
        let raw = self.llm.complete(&prompt).await?;
        state.answer = parse_answer(&raw);
        Ok(())
    }
}
