// Library error types
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the library outside the pure analytics core
#[derive(Error, Debug)]
pub enum ChatGraphError {
    #[error("Unknown export format: {0} (expected json, csv, text or dot)")]
    UnknownFormat(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unrecognized transcript layout in {0}")]
    TranscriptLayout(PathBuf),

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("API key not set (environment variable {0})")]
    MissingApiKey(String),

    #[error("LLM API error: {0}")]
    Llm(String),
}

impl ChatGraphError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChatGraphError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        ChatGraphError::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatGraphError>;
