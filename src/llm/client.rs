use crate::types::{Message, Result};
use async_trait::async_trait;

/// Seam to the external completion service.
///
/// The service receives the fully assembled prompt (system context, rendered
/// history, new user message) and returns the assistant's reply. A single
/// blocking call per request, no internal retries: failures surface as
/// `AppError::CompletionService` and retry policy belongs to the caller's
/// host layer.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send role-tagged messages and return the assistant reply.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;
}
