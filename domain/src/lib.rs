pub mod conversation;
pub mod models;
pub mod organization;
