//! Directory ingestion.
//!
//! Best-effort, partial by design: each file is loaded and chunked on its
//! own, a failing file is recorded and skipped, and the remaining files still
//! make it into the index. The per-file outcomes are collected into an
//! [`IngestReport`] instead of being swallowed.

use crate::rag::chunker::{Chunk, TextChunker};
use crate::rag::embeddings::Embedder;
use crate::rag::loader::DocumentSource;
use crate::rag::store::VectorIndex;
use crate::utils::config::RagConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of ingesting one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub chunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-file results of a directory scan.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub files: Vec<FileOutcome>,
    pub chunks_indexed: usize,
    pub completed_at: DateTime<Utc>,
}

impl IngestReport {
    pub fn log(&self) {
        for outcome in &self.files {
            match &outcome.error {
                Some(error) => warn!(file = %outcome.file, %error, "file skipped"),
                None => info!(file = %outcome.file, chunks = outcome.chunks, "file loaded"),
            }
        }
        info!(
            files = self.files.len(),
            chunks_indexed = self.chunks_indexed,
            completed_at = %self.completed_at,
            "ingestion finished"
        );
    }
}

/// Load and chunk every supported file in `dir`.
///
/// Files with other extensions are skipped silently; files that fail to
/// decode are recorded in the outcomes and skipped.
pub fn load_directory(dir: &Path, chunker: &TextChunker) -> (Vec<Chunk>, Vec<FileOutcome>) {
    let mut chunks = Vec::new();
    let mut outcomes = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read document directory");
            return (chunks, outcomes);
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    for path in paths {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let source = match DocumentSource::for_path(&path) {
            Ok(source) => source,
            Err(_) => {
                debug!(%file, "skipping file with unsupported extension");
                continue;
            }
        };

        match source.decode() {
            Ok(documents) => {
                let file_chunks = chunker.split(&documents);
                outcomes.push(FileOutcome {
                    file,
                    chunks: file_chunks.len(),
                    error: None,
                });
                chunks.extend(file_chunks);
            }
            Err(e) => {
                outcomes.push(FileOutcome {
                    file,
                    chunks: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    (chunks, outcomes)
}

/// Scan the configured documents directory and build a fresh index with the
/// bulk chunking policy.
///
/// Never fails the caller: an empty directory or a failed build yields
/// `None` with the cause captured in the report and the logs.
pub async fn rebuild_index(
    rag: &RagConfig,
    embedder: &dyn Embedder,
) -> (Option<VectorIndex>, IngestReport) {
    let chunker = TextChunker::new(rag.chunk_size, rag.chunk_overlap);
    let (chunks, files) = load_directory(&rag.documents_dir, &chunker);

    if chunks.is_empty() {
        info!(dir = %rag.documents_dir.display(), "no documents to index");
        return (
            None,
            IngestReport {
                files,
                chunks_indexed: 0,
                completed_at: Utc::now(),
            },
        );
    }

    match VectorIndex::build(chunks, embedder).await {
        Ok(index) => {
            let report = IngestReport {
                files,
                chunks_indexed: index.len(),
                completed_at: Utc::now(),
            };
            (Some(index), report)
        }
        Err(e) => {
            warn!(error = %e, "index build failed");
            (
                None,
                IngestReport {
                    files,
                    chunks_indexed: 0,
                    completed_at: Utc::now(),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use std::io::Write;
    use tempfile::TempDir;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(AppError::Embedding("endpoint down".to_string()))
        }
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) {
        let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn rag_config(dir: &TempDir) -> RagConfig {
        RagConfig {
            documents_dir: dir.path().to_path_buf(),
            chunk_size: 500,
            chunk_overlap: 50,
            upload_chunk_size: 1000,
            upload_chunk_overlap: 200,
            retrieve_k: 2,
        }
    }

    #[test]
    fn load_directory_skips_unsupported_and_empty_files() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "good.txt", "usable content here");
        write_file(&dir, "image.png", "not a document");
        write_file(&dir, "empty.txt", "   ");

        let chunker = TextChunker::new(500, 50);
        let (chunks, outcomes) = load_directory(dir.path(), &chunker);

        assert_eq!(chunks.len(), 1);
        // The png is skipped silently; the empty txt is a recorded failure.
        assert_eq!(outcomes.len(), 2);
        let empty = outcomes.iter().find(|o| o.file == "empty.txt").unwrap();
        assert!(empty.error.is_some());
        let good = outcomes.iter().find(|o| o.file == "good.txt").unwrap();
        assert_eq!(good.chunks, 1);
        assert!(good.error.is_none());
    }

    #[tokio::test]
    async fn rebuild_on_empty_directory_yields_no_index() {
        let dir = TempDir::new().unwrap();

        let (index, report) = rebuild_index(&rag_config(&dir), &StubEmbedder).await;

        assert!(index.is_none());
        assert_eq!(report.chunks_indexed, 0);
        assert!(report.files.is_empty());
    }

    #[tokio::test]
    async fn rebuild_indexes_all_supported_files() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.txt", "first document");
        write_file(&dir, "b.txt", "second document");

        let (index, report) = rebuild_index(&rag_config(&dir), &StubEmbedder).await;

        let index = index.expect("index should be built");
        assert_eq!(index.len(), 2);
        assert_eq!(report.chunks_indexed, 2);
        assert_eq!(report.files.len(), 2);
    }

    #[tokio::test]
    async fn rebuild_survives_embedding_outage() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.txt", "some content");

        let (index, report) = rebuild_index(&rag_config(&dir), &FailingEmbedder).await;

        assert!(index.is_none());
        assert_eq!(report.chunks_indexed, 0);
        // The file itself decoded fine.
        assert!(report.files[0].error.is_none());
    }
}
