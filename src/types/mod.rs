use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub message: String,
    /// Retrieved passages that were placed in the system prompt.
    pub context_used: String,
    pub sources: Vec<SourceRef>,
    /// Number of turns currently held in the conversation window.
    pub history_length: usize,
}

/// Attribution for a retrieved passage: file basename plus page, or "N/A"
/// when the source has no page structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SourceRef {
    pub file: String,
    pub page: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentUploadResponse {
    pub message: String,
    pub file: String,
    pub chunks_indexed: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub indexed_chunks: usize,
    pub history_length: usize,
}

// ============= Prompt Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// File extension is neither `.txt` nor `.pdf`.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// A file could not be decoded into text. Ingestion continues with the
    /// remaining files.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    /// The embedding endpoint failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// No index exists and the just-in-time rebuild yielded nothing.
    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),

    /// The completion service could not be reached or returned an error.
    #[error("completion service error: {0}")]
    CompletionService(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match self {
            AppError::UnsupportedType(ext) => (
                StatusCode::BAD_REQUEST,
                format!("unsupported file type: {}", ext),
            ),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::CompletionService(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::IndexUnavailable(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("vector index unavailable: {}", msg),
            ),
            AppError::Decode { path, reason } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to decode {}: {}", path, reason),
            ),
            AppError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
