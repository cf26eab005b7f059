//! Document loading.
//!
//! [`DocumentSource`] is a closed set of supported file formats, selected by
//! file extension. Each variant knows how to decode its file into one or more
//! [`RawDocument`]s carrying source metadata for later attribution.

use crate::types::{AppError, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One unit of decoded document text. Ephemeral: exists only between loading
/// and chunking.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub text: String,
    pub source_path: String,
    pub page: Option<u32>,
}

/// A file the loader knows how to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Text(PathBuf),
    Pdf(PathBuf),
}

impl DocumentSource {
    /// Select a loader for `path` by extension, case-insensitive.
    pub fn for_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(DocumentSource::Text(path.to_path_buf())),
            "pdf" => Ok(DocumentSource::Pdf(path.to_path_buf())),
            "" => Err(AppError::UnsupportedType("(no extension)".to_string())),
            other => Err(AppError::UnsupportedType(format!(".{}", other))),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            DocumentSource::Text(p) | DocumentSource::Pdf(p) => p,
        }
    }

    /// Decode the file into raw documents.
    ///
    /// Text files are tried as UTF-8 first and fall back to Latin-1, so a
    /// `.txt` file with stray high bytes still yields a document instead of
    /// aborting ingestion. PDF files produce one document per page.
    pub fn decode(&self) -> Result<Vec<RawDocument>> {
        match self {
            DocumentSource::Text(path) => decode_text(path),
            DocumentSource::Pdf(path) => decode_pdf(path),
        }
    }
}

fn decode_error(path: &Path, reason: impl ToString) -> AppError {
    AppError::Decode {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn decode_text(path: &Path) -> Result<Vec<RawDocument>> {
    let bytes = std::fs::read(path).map_err(|e| decode_error(path, e))?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                path = %path.display(),
                "UTF-8 decoding failed, falling back to Latin-1"
            );
            // Latin-1: every byte maps directly to the code point of the
            // same value, so this cannot fail.
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    if text.trim().is_empty() {
        return Err(decode_error(path, "no text content"));
    }

    Ok(vec![RawDocument {
        text,
        source_path: path.display().to_string(),
        page: None,
    }])
}

fn decode_pdf(path: &Path) -> Result<Vec<RawDocument>> {
    let text = pdf_extract::extract_text(path).map_err(|e| decode_error(path, e))?;

    // pdf-extract separates pages with form feeds.
    let pages: Vec<RawDocument> = text
        .split('\u{0c}')
        .enumerate()
        .filter(|(_, page_text)| !page_text.trim().is_empty())
        .map(|(i, page_text)| RawDocument {
            text: page_text.to_string(),
            source_path: path.display().to_string(),
            page: Some(i as u32 + 1),
        })
        .collect();

    if pages.is_empty() {
        return Err(decode_error(path, "no text content"));
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn selects_loader_by_extension_case_insensitive() {
        assert!(matches!(
            DocumentSource::for_path(Path::new("notes.txt")),
            Ok(DocumentSource::Text(_))
        ));
        assert!(matches!(
            DocumentSource::for_path(Path::new("REPORT.PDF")),
            Ok(DocumentSource::Pdf(_))
        ));
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = DocumentSource::for_path(Path::new("image.png")).unwrap_err();
        match err {
            AppError::UnsupportedType(ext) => assert_eq!(ext, ".png"),
            other => panic!("expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(matches!(
            DocumentSource::for_path(Path::new("Makefile")),
            Err(AppError::UnsupportedType(_))
        ));
    }

    #[test]
    fn decodes_utf8_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "doc.txt", "hello wörld".as_bytes());

        let docs = DocumentSource::for_path(&path).unwrap().decode().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "hello wörld");
        assert_eq!(docs[0].page, None);
    }

    #[test]
    fn falls_back_to_latin1_on_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        // 0xE9 is 'é' in Latin-1 but invalid as a standalone UTF-8 byte.
        let path = write_file(&dir, "doc.txt", b"caf\xe9 menu");

        let docs = DocumentSource::for_path(&path).unwrap().decode().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "café menu");
    }

    #[test]
    fn empty_text_file_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "doc.txt", b"   \n  ");

        let err = DocumentSource::for_path(&path).unwrap().decode().unwrap_err();
        assert!(matches!(err, AppError::Decode { .. }));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = DocumentSource::Text(PathBuf::from("/nonexistent/doc.txt"))
            .decode()
            .unwrap_err();
        assert!(matches!(err, AppError::Decode { .. }));
    }
}
