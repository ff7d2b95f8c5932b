// Public modules
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod observability;
pub mod prompts;
pub mod store;
pub mod types;

// Re-exports
pub use client::{ChatModel, OpenAi};
pub use config::Config;
pub use error::{Error, Result};
pub use store::ConversationStore;
pub use types::*;
