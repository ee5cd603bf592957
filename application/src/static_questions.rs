use crate::chat_service::ChatService;
use domain::conversation::ChatTurn;
use domain::organization::Organization;
use infrastructure::store::StoreRegistry;
use shared::types::{CoreError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Canned questions answered ahead of time for every user. The phrasing
/// nudges the model toward noun-heavy answers that read well standalone.
pub const STATIC_QUESTIONS: [&str; 3] = [
    "Give me the contact information. In your response, try to use nouns more than pronouns.",
    "What are the services do you offer? In your response, try to use nouns more than pronouns.",
    "How are you different from others? In your response, try to use nouns more than pronouns.",
];

/// The same questions without the phrasing hint, as shown to users.
const FRONTEND_QUESTIONS: [&str; 3] = [
    "Give me the contact information.",
    "What are the services do you offer?",
    "How are you different from others?",
];

/// Explicit retry policy: total attempts and a fixed delay between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_secs(60),
        }
    }
}

/// Runs `op` until it succeeds or the policy's attempts are exhausted,
/// sleeping the fixed delay between attempts. The last error is surfaced
/// unmodified.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts => {
                warn!(attempt, error = %err, "retrying after failure");
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Answers the canned question set through the chat pipeline and persists
/// the results alongside the user's profile.
pub struct StaticQuestionService {
    chat: Arc<ChatService>,
    registry: Arc<StoreRegistry>,
}

impl StaticQuestionService {
    pub fn new(chat: Arc<ChatService>, registry: Arc<StoreRegistry>) -> Self {
        Self { chat, registry }
    }

    /// Each question is a standalone single-turn history. Per-question
    /// invocations retry once on any failure before giving up.
    pub async fn answer_static_questions(
        &self,
        username: &str,
        organization: Organization,
        policy: RetryPolicy,
    ) -> Result<Vec<String>> {
        let mut answers = Vec::with_capacity(STATIC_QUESTIONS.len());
        for question in STATIC_QUESTIONS {
            let history = [ChatTurn::new(question, "")];
            let answer = with_retry(policy, || {
                self.chat.answer(username, organization, &history)
            })
            .await?;
            answers.push(answer);
        }
        self.registry
            .store(organization)
            .update_static_answers(username, &answers)?;
        Ok(answers)
    }

    /// Pairs the user-facing question list with the stored answers.
    pub fn static_answers_for(
        &self,
        username: &str,
        organization: Organization,
    ) -> Result<Vec<(String, String)>> {
        let user = self
            .registry
            .store(organization)
            .find_user(username)?
            .ok_or_else(|| CoreError::NotFound(format!("user {username} not found")))?;
        Ok(FRONTEND_QUESTIONS
            .iter()
            .zip(user.static_answers)
            .map(|(question, answer)| (question.to_string(), answer))
            .collect())
    }
}
