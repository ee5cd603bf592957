use serde::{Deserialize, Serialize};

/// Tenant isolation boundary. Each organization has its own user set,
/// storage namespace and RAG prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Organization {
    Manufacturing,
    Finance,
    RealEstate,
    General,
}

impl Organization {
    pub const ALL: [Organization; 4] = [
        Organization::Manufacturing,
        Organization::Finance,
        Organization::RealEstate,
        Organization::General,
    ];

    /// Stable key used for storage namespaces and CLI arguments.
    pub fn key(&self) -> &'static str {
        match self {
            Organization::Manufacturing => "manufacturing",
            Organization::Finance => "finance",
            Organization::RealEstate => "real_estate",
            Organization::General => "general",
        }
    }

    /// Unknown or unspecified organizations fall back to the default
    /// (`general`) profile rather than failing.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("manufacturing") => Organization::Manufacturing,
            Some("finance") => Organization::Finance,
            Some("real_estate") => Organization::RealEstate,
            _ => Organization::General,
        }
    }

    /// File name of this organization's RAG answer template.
    pub fn rag_prompt_file(&self) -> &'static str {
        match self {
            Organization::Manufacturing => "manufacturing-rag-prompt.md",
            Organization::Finance => "finance-rag-prompt.md",
            Organization::RealEstate => "real-estate-rag-prompt.md",
            Organization::General => "chatbot-rag-prompt.md",
        }
    }
}

impl Default for Organization {
    fn default() -> Self {
        Organization::General
    }
}

impl std::fmt::Display for Organization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Template kinds resolvable through the prompt store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Greeting/intent classification; shared by every organization.
    IntentClassifier,
    /// Retrieval-augmented answer; selected per organization.
    RagAnswer,
}
