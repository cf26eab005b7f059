//! # biblio-server
//!
//! A retrieval-augmented document chat server. Text and PDF documents are
//! decoded, chunked, and embedded into an in-memory vector index; chat
//! requests retrieve the nearest chunks and forward them, together with a
//! bounded window of recent conversation turns, to an external
//! OpenAI-compatible completion endpoint.
//!
//! ## Architecture
//!
//! - Ingestion: loader → chunker → vector index (best-effort per file)
//! - Query: embed → k-NN lookup → prompt assembly → completion call
//!
//! Both flows share the process-wide [`AppState`]: the vector index and the
//! conversation window behind `RwLock`s, and the embedding/completion
//! clients behind trait objects. Clearing or rebuilding the index never
//! touches the conversation window, and vice versa.
//!
//! ## Modules
//!
//! - [`api`] - Axum routes and handlers
//! - [`llm`] - Completion service clients
//! - [`memory`] - Bounded conversation history
//! - [`rag`] - Loading, chunking, embedding, and the vector index
//! - [`types`] - Request/response types and error handling
//! - [`utils`] - Environment-based configuration

/// HTTP API handlers and routes.
pub mod api;
/// Completion service clients.
pub mod llm;
/// Conversation history.
pub mod memory;
/// Retrieval pipeline: loaders, chunking, embeddings, vector index.
pub mod rag;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{CompletionClient, OpenAIClient};
pub use rag::embeddings::{Embedder, OpenAIEmbedder};
pub use types::{AppError, Result};
pub use utils::config::Config;

use crate::memory::history::ConversationWindow;
use crate::rag::store::VectorIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// Application state shared across handlers.
///
/// The index starts absent and is populated by the startup scan, a document
/// upload, or the just-in-time rebuild in the chat handler. Locks are held
/// only for short synchronous sections, never across the embedding or
/// completion calls.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Similarity-searchable store of embedded chunks; `None` until the
    /// first successful ingestion.
    pub index: Arc<RwLock<Option<VectorIndex>>>,
    /// Bounded window of recent conversation turns.
    pub history: Arc<RwLock<ConversationWindow>>,
    /// Embedding function, shared by ingestion and query.
    pub embedder: Arc<dyn Embedder>,
    /// External completion service client.
    pub completion: Arc<dyn CompletionClient>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        let history = ConversationWindow::new(config.chat.history_turns);
        Self {
            config,
            index: Arc::new(RwLock::new(None)),
            history: Arc::new(RwLock::new(history)),
            embedder,
            completion,
        }
    }
}
