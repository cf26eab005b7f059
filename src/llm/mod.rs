//! Completion service clients.

pub mod client;
pub mod openai;

pub use client::CompletionClient;
pub use openai::OpenAIClient;
