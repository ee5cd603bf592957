use crate::organization::Organization;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One (question, answer) element of a raw chat-turn history. The answer is
/// empty for a turn that has not been answered yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Per-invocation state record owned by one run of the agent pipeline.
/// Created per chat request and discarded after the answer is extracted;
/// never shared across concurrent requests, never persisted.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub current_question: String,
    pub username: String,
    pub organization: Organization,
    pub greeting: bool,
    pub standalone_question: String,
    pub answer: String,
}

impl ConversationState {
    pub fn new(
        current_question: impl Into<String>,
        messages: Vec<Message>,
        username: impl Into<String>,
        organization: Organization,
    ) -> Self {
        Self {
            messages,
            current_question: current_question.into(),
            username: username.into(),
            organization,
            greeting: false,
            standalone_question: String::new(),
            answer: String::new(),
        }
    }

    /// Render prior turns as a chat-history block, one `User:` line per
    /// question and one `Assistant:` line per answer. Returns the literal
    /// "Empty" when there are no prior turns.
    pub fn chat_history(&self) -> String {
        if self.messages.is_empty() {
            return "Empty".to_string();
        }
        self.messages
            .iter()
            .map(|msg| match msg.role {
                Role::User => format!("User: {}", msg.content),
                Role::Assistant => format!("Assistant: {}", msg.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
