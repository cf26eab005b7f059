//! Text chunking for document ingestion.
//!
//! Splits decoded documents on line boundaries, then greedily packs lines
//! into windows of at most `chunk_size` characters with `chunk_overlap`
//! characters of repeated tail between consecutive windows from the same
//! source. Chunk size is a hard ceiling: an oversized chunk is truncated and
//! logged rather than emitted as-is.

use crate::rag::loader::RawDocument;
use tracing::warn;

/// A bounded span of document text with retained source metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub source_path: String,
    pub page: Option<u32>,
}

pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// `chunk_overlap` must be smaller than `chunk_size`; config validation
    /// enforces this for the two built-in policies.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        assert!(
            chunk_overlap < chunk_size,
            "chunk_overlap must be smaller than chunk_size"
        );
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split every document into chunks, carrying the source metadata of the
    /// originating document onto each derived chunk.
    pub fn split(&self, documents: &[RawDocument]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for doc in documents {
            for text in self.split_text(&doc.text) {
                let text = self.enforce_ceiling(text, &doc.source_path);
                chunks.push(Chunk {
                    text,
                    source_path: doc.source_path.clone(),
                    page: doc.page,
                });
            }
        }

        chunks
    }

    fn split_text(&self, text: &str) -> Vec<String> {
        // Pass 1: line pieces, with oversized lines hard-split into
        // overlapping fixed-size windows.
        let mut pieces: Vec<String> = Vec::new();
        for line in text.split('\n') {
            if line.chars().count() <= self.chunk_size {
                pieces.push(line.to_string());
            } else {
                self.hard_split(line, &mut pieces);
            }
        }

        // Pass 2: greedily pack pieces into windows, carrying up to
        // `chunk_overlap` characters of trailing pieces into the next window.
        let mut chunks: Vec<String> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = piece.chars().count();

            // Flush until the piece fits (at most twice: once for the full
            // window, once if the overlap tail plus piece still overflows).
            while !current.is_empty() && current_len + joined_len(&current, piece_len) > self.chunk_size
            {
                chunks.push(current.join("\n"));
                let (tail, tail_len) = self.overlap_tail(&current);
                if tail_len == current_len {
                    // Tail did not shrink; drop it to guarantee progress.
                    current = Vec::new();
                    current_len = 0;
                } else {
                    current = tail;
                    current_len = tail_len;
                }
            }

            current_len += joined_len(&current, piece_len);
            current.push(piece);
        }

        if !current.is_empty() {
            chunks.push(current.join("\n"));
        }

        chunks
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect()
    }

    /// Split a single line longer than `chunk_size` into windows of exactly
    /// `chunk_size` characters stepping by `chunk_size - chunk_overlap`.
    fn hard_split(&self, line: &str, out: &mut Vec<String>) {
        let chars: Vec<char> = line.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            out.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
    }

    /// Trailing pieces of the finished window totalling at most
    /// `chunk_overlap` characters, in original order.
    fn overlap_tail(&self, window: &[String]) -> (Vec<String>, usize) {
        let mut tail: Vec<String> = Vec::new();
        let mut tail_len = 0usize;

        for piece in window.iter().rev() {
            let added = joined_len(&tail, piece.chars().count());
            if tail_len + added > self.chunk_overlap {
                break;
            }
            tail_len += added;
            tail.push(piece.clone());
        }

        tail.reverse();
        (tail, tail_len)
    }

    fn enforce_ceiling(&self, text: String, source: &str) -> String {
        let len = text.chars().count();
        if len <= self.chunk_size {
            return text;
        }
        warn!(
            source,
            chunk_chars = len,
            limit = self.chunk_size,
            "chunk exceeds size limit, truncating"
        );
        text.chars().take(self.chunk_size).collect()
    }
}

fn joined_len(window: &[String], piece_len: usize) -> usize {
    // +1 for the newline re-inserted on join.
    if window.is_empty() {
        piece_len
    } else {
        piece_len + 1
    }
}
