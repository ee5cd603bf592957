pub mod config;
pub mod embedder;
pub mod ollama_client;
pub mod prompt_store;
pub mod providers;
pub mod search;
pub mod store;
pub mod vector_index;
