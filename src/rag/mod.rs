//! Retrieval pipeline.
//!
//! Ingestion flows loader → chunker → store; queries flow embedder → store.
//! Both share the process-wide index and the same embedding function.
//!
//! - [`loader`] - File-type dispatch and text/PDF decoding
//! - [`chunker`] - Fixed-size overlapping text chunks
//! - [`embeddings`] - Embedding seam and OpenAI-compatible client
//! - [`store`] - In-memory vector index with k-NN lookup
//! - [`ingest`] - Best-effort directory scans with per-file reporting

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod loader;
pub mod store;
