use domain::organization::{Organization, PromptKind};
use shared::types::{CoreError, Result};
use std::path::PathBuf;

/// Resolves (template kind, organization) to tenant-specific prompt text.
/// The intent classifier is organization-agnostic; the RAG answer template is
/// chosen per organization profile.
pub struct PromptStore {
    dir: PathBuf,
}

impl PromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn resolve(&self, kind: PromptKind, organization: Organization) -> Result<String> {
        let file_name = match kind {
            PromptKind::IntentClassifier => "chatbot-query-analyzer-prompt.md",
            PromptKind::RagAnswer => organization.rag_prompt_file(),
        };
        let path = self.dir.join(file_name);
        let content = std::fs::read_to_string(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                CoreError::NotFound(format!("prompt template {file_name} not found"))
            } else {
                CoreError::Storage(err.to_string())
            }
        })?;
        Ok(content.trim().to_string())
    }
}

/// Ordinary named-placeholder interpolation: every literal `{name}` is
/// replaced by its value. No control flow, no escaping.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}
