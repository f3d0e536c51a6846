// Keyword co-occurrence analytics over chat transcripts

pub mod exporter;
pub mod graph;
pub mod keywords;
pub mod layout;
pub mod render;
pub mod stats;

pub use exporter::{export, export_named, ExportFormat};
pub use graph::{build_graph, build_graph_default, KeywordGraph};
pub use keywords::extract_keywords;
pub use render::{render, render_conversation, GraphRenderer, RenderOutcome, SvgRenderer};
pub use stats::{summarize, FrequencyTable, Statistics};
