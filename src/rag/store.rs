//! In-memory vector index.
//!
//! A brute-force cosine-distance store of embedded chunks. The index is
//! append-only: entries are never updated or removed once stored, and a full
//! rebuild replaces the index wholesale rather than mutating it. All state
//! lives in process memory for the process lifetime.

use crate::rag::chunker::Chunk;
use crate::rag::embeddings::Embedder;
use crate::types::{AppError, Result};
use tracing::{debug, warn};
use uuid::Uuid;

/// A stored chunk and its embedding. The embedding is always the embedder
/// applied to `chunk.text`.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: Uuid,
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embed every chunk and build a fresh index.
    ///
    /// Per-chunk embedding failures are logged and skipped; the build fails
    /// only if no entry survives, so a partial ingestion still yields a
    /// usable index.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        if chunks.is_empty() {
            return Err(AppError::InvalidInput("no chunks to index".to_string()));
        }

        let entries = embed_chunks(chunks, embedder).await;
        Self::from_entries(entries)
    }

    /// Build an index from already-embedded entries.
    ///
    /// Dimensionality is fixed by the first entry; entries with a different
    /// dimensionality are dropped with a warning.
    pub fn from_entries(entries: Vec<IndexEntry>) -> Result<Self> {
        let dimensions = entries
            .first()
            .map(|e| e.embedding.len())
            .ok_or_else(|| AppError::Embedding("embedding failed for every chunk".to_string()))?;

        let mut index = Self {
            dimensions,
            entries: Vec::with_capacity(entries.len()),
        };
        index.merge(entries);
        Ok(index)
    }

    /// Append entries without touching prior ones. Returns the number of
    /// entries actually added.
    pub fn merge(&mut self, entries: Vec<IndexEntry>) -> usize {
        let before = self.entries.len();
        for entry in entries {
            if entry.embedding.len() != self.dimensions {
                warn!(
                    source = %entry.chunk.source_path,
                    got = entry.embedding.len(),
                    expected = self.dimensions,
                    "dropping entry with mismatched embedding dimensions"
                );
                continue;
            }
            self.entries.push(entry);
        }
        self.entries.len() - before
    }

    /// Return up to `k` chunks nearest to `embedding`, ascending by cosine
    /// distance. Fewer than `k` results only when the index holds fewer
    /// entries.
    pub fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<(&Chunk, f32)>> {
        if embedding.len() != self.dimensions {
            return Err(AppError::Embedding(format!(
                "query embedding has {} dimensions, index has {}",
                embedding.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<(&Chunk, f32)> = self
            .entries
            .iter()
            .map(|e| (&e.chunk, cosine_distance(embedding, &e.embedding)))
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!(results = scored.len(), k, "index query");
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embed chunks into index entries, skipping chunks whose embedding call
/// fails. Best-effort by design: one bad chunk never aborts the batch.
pub async fn embed_chunks(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Vec<IndexEntry> {
    let mut entries = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        match embedder.embed(&chunk.text).await {
            Ok(embedding) => entries.push(IndexEntry {
                id: Uuid::new_v4(),
                chunk,
                embedding,
            }),
            Err(e) => {
                warn!(
                    source = %chunk.source_path,
                    error = %e,
                    "skipping chunk, embedding failed"
                );
            }
        }
    }

    entries
}

/// Cosine distance: `1 - cosine_similarity`, so nearest is smallest.
/// Zero-norm vectors compare as maximally distant.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    1.0 - dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic embedder: projects text onto a fixed 3-axis basis.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let axes = ["alpha", "beta", "gamma"];
            Ok(axes
                .iter()
                .map(|axis| text.matches(axis).count() as f32)
                .collect())
        }
    }

    /// Fails on texts containing "poison", succeeds otherwise.
    struct FlakyEmbedder;

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains("poison") {
                Err(AppError::Embedding("boom".to_string()))
            } else {
                StubEmbedder.embed(text).await
            }
        }
    }

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            source_path: "documents/test.txt".to_string(),
            page: None,
        }
    }

    #[tokio::test]
    async fn builds_and_queries_nearest_first() {
        let chunks = vec![chunk("alpha alpha alpha"), chunk("beta beta"), chunk("gamma")];
        let index = VectorIndex::build(chunks, &StubEmbedder).await.unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.dimensions(), 3);

        let query = StubEmbedder.embed("alpha").await.unwrap();
        let hits = index.query(&query, 2).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0.text, "alpha alpha alpha");
        assert!(hits[0].1 <= hits[1].1, "results must be ascending by distance");
    }

    #[tokio::test]
    async fn query_returns_fewer_than_k_only_when_index_is_smaller() {
        let index = VectorIndex::build(vec![chunk("alpha")], &StubEmbedder)
            .await
            .unwrap();

        let query = StubEmbedder.embed("alpha").await.unwrap();
        assert_eq!(index.query(&query, 5).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn build_rejects_empty_input() {
        let err = VectorIndex::build(vec![], &StubEmbedder).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn build_skips_failing_chunks_and_keeps_the_rest() {
        let chunks = vec![chunk("alpha"), chunk("poison beta"), chunk("gamma")];
        let index = VectorIndex::build(chunks, &FlakyEmbedder).await.unwrap();

        assert_eq!(index.len(), 2);
    }

    #[tokio::test]
    async fn build_fails_when_every_chunk_fails() {
        let chunks = vec![chunk("poison"), chunk("poison too")];
        let err = VectorIndex::build(chunks, &FlakyEmbedder).await.unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
    }

    #[tokio::test]
    async fn merge_is_additive_only() {
        let mut index = VectorIndex::build(vec![chunk("alpha"), chunk("beta")], &StubEmbedder)
            .await
            .unwrap();

        let before: Vec<(Uuid, Vec<f32>, String)> = index
            .entries
            .iter()
            .map(|e| (e.id, e.embedding.clone(), e.chunk.source_path.clone()))
            .collect();

        let added = embed_chunks(vec![chunk("gamma gamma")], &StubEmbedder).await;
        assert_eq!(index.merge(added), 1);
        assert_eq!(index.len(), 3);

        // Prior entries are untouched.
        for (i, (id, embedding, source)) in before.iter().enumerate() {
            assert_eq!(index.entries[i].id, *id);
            assert_eq!(&index.entries[i].embedding, embedding);
            assert_eq!(&index.entries[i].chunk.source_path, source);
        }
    }

    #[tokio::test]
    async fn merge_drops_mismatched_dimensions() {
        let mut index = VectorIndex::build(vec![chunk("alpha")], &StubEmbedder)
            .await
            .unwrap();

        let bad = IndexEntry {
            id: Uuid::new_v4(),
            chunk: chunk("odd one"),
            embedding: vec![1.0; 7],
        };
        assert_eq!(index.merge(vec![bad]), 0);
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn query_rejects_mismatched_dimensions() {
        let index = VectorIndex::build(vec![chunk("alpha")], &StubEmbedder)
            .await
            .unwrap();

        let err = index.query(&[1.0; 8], 2).unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
    }

    #[test]
    fn cosine_distance_basics() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        assert!((cosine_distance(&[0.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
