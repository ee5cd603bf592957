use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_base_url: String,
    pub chat_model: String,
    pub embed_model: String,
    /// Directory holding one database file per organization.
    pub data_dir: PathBuf,
    /// Directory holding the prompt template files.
    pub prompts_dir: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        dotenv().ok();
        Self {
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            chat_model: env::var("OLLAMA_CHAT_MODEL")
                .unwrap_or_else(|_| "llama3.1:70b".to_string()),
            embed_model: env::var("OLLAMA_EMBED_MODEL")
                .unwrap_or_else(|_| "nomic-embed-text".to_string()),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            prompts_dir: env::var("PROMPTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("prompts")),
        }
    }
}
