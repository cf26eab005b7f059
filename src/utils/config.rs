use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub completion: CompletionConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of an OpenAI-compatible chat completion endpoint.
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible embeddings endpoint. Defaults to the
    /// completion endpoint's base.
    pub api_base: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagConfig {
    pub documents_dir: PathBuf,
    /// Chunking policy for the bulk directory scan.
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Looser chunking policy for single-document uploads.
    pub upload_chunk_size: usize,
    pub upload_chunk_overlap: usize,
    /// Number of nearest chunks retrieved per query.
    pub retrieve_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Maximum number of (user, assistant) turns kept in the window.
    pub history_turns: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let completion_base = env::var("COMPLETION_API_BASE")
            .unwrap_or_else(|_| "http://127.0.0.1:1234/v1".to_string());

        let config = Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()?,
            },
            completion: CompletionConfig {
                api_base: completion_base.clone(),
                api_key: env::var("COMPLETION_API_KEY").ok(),
                model: env::var("COMPLETION_MODEL")
                    .unwrap_or_else(|_| "mathstral-7b-v0.1".to_string()),
            },
            embedding: EmbeddingConfig {
                api_base: env::var("EMBEDDING_API_BASE").unwrap_or(completion_base),
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string()),
            },
            rag: RagConfig {
                documents_dir: env::var("DOCUMENTS_DIR")
                    .unwrap_or_else(|_| "documents".to_string())
                    .into(),
                chunk_size: env::var("CHUNK_SIZE")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()?,
                chunk_overlap: env::var("CHUNK_OVERLAP")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()?,
                upload_chunk_size: env::var("UPLOAD_CHUNK_SIZE")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()?,
                upload_chunk_overlap: env::var("UPLOAD_CHUNK_OVERLAP")
                    .unwrap_or_else(|_| "200".to_string())
                    .parse()?,
                retrieve_k: env::var("RETRIEVE_K")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()?,
            },
            chat: ChatConfig {
                history_turns: env::var("HISTORY_TURNS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err("CHUNK_OVERLAP must be smaller than CHUNK_SIZE".into());
        }
        if self.rag.upload_chunk_overlap >= self.rag.upload_chunk_size {
            return Err("UPLOAD_CHUNK_OVERLAP must be smaller than UPLOAD_CHUNK_SIZE".into());
        }
        if self.rag.retrieve_k == 0 {
            return Err("RETRIEVE_K must be at least 1".into());
        }
        if self.chat.history_turns == 0 {
            return Err("HISTORY_TURNS must be at least 1".into());
        }
        Ok(())
    }
}
