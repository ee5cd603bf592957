pub mod agent;
pub mod chat_service;
pub mod response_parser;
pub mod static_questions;
pub mod user_service;
