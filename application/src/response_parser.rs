use regex::Regex;
use std::sync::LazyLock;

static RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<response>(.*?)</response>").expect("response regex is valid")
});
static GREETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<greeting>(.*?)</greeting>").expect("greeting regex is valid")
});
static STANDALONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<standalone>(.*?)</standalone>").expect("standalone regex is valid")
});

/// Structured fields extracted from the intent-classifier completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentOutcome {
    pub answer: String,
    pub is_greeting: bool,
    pub standalone_question: String,
}

fn capture(re: &Regex, raw: &str) -> Option<String> {
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the tagged regions of an intent completion. Any missing tag
/// yields that field's default. The greeting flag is true only when the
/// tag's text, lower-cased, equals the literal "true".
pub fn parse_intent(raw: &str) -> IntentOutcome {
    IntentOutcome {
        answer: capture(&RESPONSE_RE, raw).unwrap_or_default(),
        is_greeting: capture(&GREETING_RE, raw)
            .map(|g| g.to_lowercase() == "true")
            .unwrap_or(false),
        standalone_question: capture(&STANDALONE_RE, raw).unwrap_or_default(),
    }
}

/// Extract the answer region of a RAG completion. A trimmed, lower-cased
/// content of exactly "none" means the model declined to answer and maps
/// to an empty string.
pub fn parse_answer(raw: &str) -> String {
    let Some(response) = capture(&RESPONSE_RE, raw) else {
        return String::new();
    };
    let trimmed = response.trim();
    if trimmed.to_lowercase() == "none" {
        String::new()
    } else {
        trimmed.to_string()
    }
}
