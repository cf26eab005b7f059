//! Retrieval-augmented chat endpoint.

use crate::memory::history::ConversationTurn;
use crate::rag::chunker::Chunk;
use crate::rag::ingest;
use crate::types::{AppError, ChatRequest, ChatResponse, Message, Result, SourceRef};
use crate::AppState;
use axum::{extract::State, Json};
use std::path::Path;
use tracing::info;

const SYSTEM_PROMPT_PREFIX: &str =
    "You are a helpful assistant. Use the following context to answer the question: ";

/// Answer a user message with retrieved document context.
///
/// Request flow: resolve the index (one just-in-time rebuild if absent),
/// retrieve the nearest chunks, assemble system context + history + the new
/// user turn, call the completion service, then record the turn.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Chat response with source attribution", body = ChatResponse),
        (status = 400, description = "Empty message"),
        (status = 500, description = "No documents indexed"),
        (status = 503, description = "Completion service unreachable")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let user_message = payload.message.trim().to_string();
    if user_message.is_empty() {
        return Err(AppError::InvalidInput("message required".to_string()));
    }

    // Resolve the index, with a single synchronous rebuild attempt when it
    // is absent.
    if state.index.read().is_none() {
        info!("vector index absent, rebuilding from document directory");
        let (index, report) = ingest::rebuild_index(&state.config.rag, state.embedder.as_ref()).await;
        report.log();
        *state.index.write() = index;
    }

    if state.index.read().is_none() {
        return Err(AppError::IndexUnavailable(
            "no documents indexed".to_string(),
        ));
    }

    let query_embedding = state.embedder.embed(&user_message).await?;

    let (context, sources) = {
        let guard = state.index.read();
        let index = guard
            .as_ref()
            .ok_or_else(|| AppError::IndexUnavailable("no documents indexed".to_string()))?;
        let hits = index.query(&query_embedding, state.config.rag.retrieve_k)?;
        build_context(&hits)
    };

    let mut messages = Vec::new();
    messages.push(Message::system(format!(
        "{}{}",
        SYSTEM_PROMPT_PREFIX, context
    )));
    messages.extend(state.history.read().render());
    messages.push(Message::user(user_message.clone()));

    let answer = state.completion.complete(&messages).await?;

    let history_length = {
        let mut history = state.history.write();
        history.push(ConversationTurn {
            user: user_message,
            assistant: answer.clone(),
        });
        history.len()
    };

    Ok(Json(ChatResponse {
        message: answer,
        context_used: context,
        sources,
        history_length,
    }))
}

/// Newline-join retrieved chunk texts into the context string and collect a
/// deduplicated attribution list (file basename plus page, "N/A" when the
/// source has no pages).
fn build_context(hits: &[(&Chunk, f32)]) -> (String, Vec<SourceRef>) {
    let context = hits
        .iter()
        .map(|(chunk, _)| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut sources: Vec<SourceRef> = Vec::new();
    for (chunk, _) in hits {
        let file = Path::new(&chunk.source_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| chunk.source_path.clone());
        let page = chunk
            .page
            .map(|p| p.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        let source = SourceRef { file, page };
        if !sources.contains(&source) {
            sources.push(source);
        }
    }

    (context, sources)
}
