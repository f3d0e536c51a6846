// campus-chat-graph library entry point
// Keyword analytics over university chatbot transcripts, plus the FAQ assistant

pub mod analytics;
pub mod assistant;
pub mod config;
pub mod error;
pub mod error_helper;
pub mod reporter;
pub mod transcript;
pub mod vocabulary;

// Re-exports
pub use analytics::{build_graph, export, summarize, ExportFormat, KeywordGraph, Statistics};
pub use config::AppConfig;
pub use error::{ChatGraphError, Result};
pub use transcript::{Message, Role, Transcript};
pub use vocabulary::Vocabulary;
