// Graph data export (json, csv, text report, Graphviz)
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use super::graph::KeywordGraph;
use super::stats::{summarize, FrequencyTable, Statistics};
use crate::error::ChatGraphError;

/// Terms listed in the text report
const REPORT_TOP: usize = 10;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
    Dot,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Json,
        ExportFormat::Csv,
        ExportFormat::Text,
        ExportFormat::Dot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "text",
            ExportFormat::Dot => "dot",
        }
    }

    /// Usual file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
            ExportFormat::Dot => "dot",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ChatGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "text" | "txt" => Ok(ExportFormat::Text),
            "dot" => Ok(ExportFormat::Dot),
            _ => Err(ChatGraphError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JSON export document
#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub nodes: &'a [String],
    pub edges: Vec<[&'a str; 2]>,
    pub frequencies: FrequencyTable,
    pub statistics: Statistics,
}

impl<'a> GraphExport<'a> {
    pub fn new<S: AsRef<str>>(graph: &'a KeywordGraph, all_keywords: &[S]) -> Self {
        GraphExport {
            nodes: graph.nodes(),
            edges: graph.edge_terms().map(|(a, b, _)| [a, b]).collect(),
            frequencies: FrequencyTable::from_keywords(all_keywords),
            statistics: summarize(graph, all_keywords),
        }
    }
}

/// Export the graph and its keyword frequencies
pub fn export<S: AsRef<str>>(graph: &KeywordGraph, all_keywords: &[S], format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => export_json(graph, all_keywords),
        ExportFormat::Csv => export_csv(all_keywords),
        ExportFormat::Text => export_text(graph, all_keywords),
        ExportFormat::Dot => export_dot(graph, all_keywords),
    }
}

/// Export by format name; an unknown name yields an empty string
pub fn export_named<S: AsRef<str>>(graph: &KeywordGraph, all_keywords: &[S], format: &str) -> String {
    match format.parse::<ExportFormat>() {
        Ok(format) => export(graph, all_keywords, format),
        Err(_) => String::new(),
    }
}

fn export_json<S: AsRef<str>>(graph: &KeywordGraph, all_keywords: &[S]) -> String {
    serde_json::to_string_pretty(&GraphExport::new(graph, all_keywords)).unwrap_or_default()
}

fn export_csv<S: AsRef<str>>(all_keywords: &[S]) -> String {
    let mut out = String::from("Palavra,Frequencia\r\n");
    for entry in FrequencyTable::from_keywords(all_keywords).ranked() {
        out.push_str(&escape_csv(&entry.term));
        out.push(',');
        out.push_str(&entry.count.to_string());
        out.push_str("\r\n");
    }
    out
}

fn export_text<S: AsRef<str>>(graph: &KeywordGraph, all_keywords: &[S]) -> String {
    let mut out = String::new();
    write_text(&mut out, graph, all_keywords).expect("writing to a String cannot fail");
    out
}

fn write_text<S: AsRef<str>>(out: &mut String, graph: &KeywordGraph, all_keywords: &[S]) -> fmt::Result {
    let frequencies = FrequencyTable::from_keywords(all_keywords);

    writeln!(out, "ANÁLISE DA CONVERSA")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out)?;
    writeln!(out, "Total de palavras-chave únicas: {}", graph.node_count())?;
    writeln!(out, "Total de conexões: {}", graph.edge_count())?;
    writeln!(out, "Total de ocorrências: {}", all_keywords.len())?;
    writeln!(out)?;
    writeln!(out, "PALAVRAS MAIS FREQUENTES:")?;
    writeln!(out, "{}", "-".repeat(30))?;
    for entry in frequencies.most_common(REPORT_TOP) {
        writeln!(out, "{}: {} ocorrência(s)", entry.term, entry.count)?;
    }
    Ok(())
}

fn export_dot<S: AsRef<str>>(graph: &KeywordGraph, all_keywords: &[S]) -> String {
    let mut out = String::new();
    write_dot(&mut out, graph, all_keywords).expect("writing to a String cannot fail");
    out
}

fn write_dot<S: AsRef<str>>(out: &mut String, graph: &KeywordGraph, all_keywords: &[S]) -> fmt::Result {
    let frequencies = FrequencyTable::from_keywords(all_keywords);

    writeln!(out, "graph KeywordGraph {{")?;
    writeln!(out, "  layout=neato;")?;
    writeln!(out, "  node [shape=circle, style=filled, fillcolor=lightblue, fontsize=8];")?;
    writeln!(out, "  edge [color=gray];")?;
    writeln!(out)?;

    for (id, term) in graph.nodes().iter().enumerate() {
        let width = 0.3 + 0.15 * frequencies.get(term) as f64;
        writeln!(
            out,
            "  n{} [label=\"{}\", width={:.2}];",
            id,
            escape_dot(term),
            width
        )?;
    }

    writeln!(out)?;

    for edge in graph.ordered_edges() {
        writeln!(
            out,
            "  n{} -- n{} [penwidth={:.1}, label=\"{}\"];",
            edge.from,
            edge.to,
            edge.weight as f64 * 0.5,
            edge.weight
        )?;
    }

    writeln!(out, "}}")
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
