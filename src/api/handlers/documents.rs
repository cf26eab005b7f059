//! Document upload endpoint.

use crate::rag::chunker::TextChunker;
use crate::rag::loader::DocumentSource;
use crate::rag::store::{self, VectorIndex};
use crate::types::{AppError, DocumentUploadResponse, Result};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Upload a `.txt` or `.pdf` document and add it to the index.
///
/// The file is persisted into the documents directory, decoded, chunked with
/// the upload policy, and appended to the index (which is created if this is
/// the first document). If processing fails the saved file is removed again.
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document indexed", body = DocumentUploadResponse),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 500, description = "Decoding or indexing failed")
    ),
    tag = "documents"
)]
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentUploadResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| AppError::InvalidInput("no file selected".to_string()))?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("failed to read upload: {}", e)))?;
            upload = Some((file_name, data.to_vec()));
            break;
        }
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::InvalidInput("no file provided".to_string()))?;
    if data.is_empty() {
        return Err(AppError::InvalidInput("no file selected".to_string()));
    }

    let file_name = sanitize_file_name(&file_name);
    let path = state.config.rag.documents_dir.join(&file_name);

    // Validate the extension before anything touches the disk.
    let source = DocumentSource::for_path(&path)?;

    tokio::fs::create_dir_all(&state.config.rag.documents_dir)
        .await
        .map_err(|e| AppError::Internal(format!("cannot create document directory: {}", e)))?;
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::Internal(format!("cannot save upload: {}", e)))?;

    match index_document(&state, &source).await {
        Ok(chunks_indexed) => {
            info!(file = %file_name, chunks_indexed, "document added");
            Ok(Json(DocumentUploadResponse {
                message: format!("Document {} added successfully", file_name),
                file: file_name,
                chunks_indexed,
            }))
        }
        Err(e) => {
            // Keep the directory consistent with the index.
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %remove_err, "failed to clean up upload");
            }
            Err(e)
        }
    }
}

/// Decode, chunk, embed, and append to the shared index. The embedding work
/// happens before the index lock is taken, so the lock is never held across
/// an await point.
async fn index_document(state: &AppState, source: &DocumentSource) -> Result<usize> {
    let documents = source.decode()?;

    let chunker = TextChunker::new(
        state.config.rag.upload_chunk_size,
        state.config.rag.upload_chunk_overlap,
    );
    let chunks = chunker.split(&documents);
    if chunks.is_empty() {
        return Err(AppError::Decode {
            path: source.path().display().to_string(),
            reason: "document produced no chunks".to_string(),
        });
    }

    let entries = store::embed_chunks(chunks, state.embedder.as_ref()).await;
    if entries.is_empty() {
        return Err(AppError::Embedding(
            "embedding failed for every chunk".to_string(),
        ));
    }

    let mut guard = state.index.write();
    match guard.as_mut() {
        Some(index) => Ok(index.merge(entries)),
        None => {
            let index = VectorIndex::from_entries(entries)?;
            let added = index.len();
            *guard = Some(index);
            Ok(added)
        }
    }
}

/// Reduce an uploaded name to a safe basename; falls back to a generated
/// name when nothing usable remains.
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if base.is_empty() || base.starts_with('.') {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let generated = PathBuf::from(format!("upload-{}", Uuid::new_v4()));
        return match ext.as_str() {
            "" => generated.display().to_string(),
            ext => generated.with_extension(ext).display().to_string(),
        };
    }

    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd.txt"), "passwd.txt");
        assert_eq!(sanitize_file_name("notes.txt"), "notes.txt");
    }

    #[test]
    fn sanitize_generates_a_name_for_hidden_or_empty_inputs() {
        let generated = sanitize_file_name(".hidden.txt");
        assert!(generated.starts_with("upload-"));
        assert!(generated.ends_with(".txt"));

        let generated = sanitize_file_name("");
        assert!(generated.starts_with("upload-"));
    }
}
