// Graph visualization behind a renderer capability
use std::fmt::{self, Write as _};
use tracing::{debug, warn};

use super::graph::{build_graph, KeywordGraph};
use super::layout::{Point, SpringLayout};
use super::stats::{summarize, FrequencyTable, Statistics, TermCount};
use crate::transcript::Message;
use crate::vocabulary::Vocabulary;

/// Terms shown in the bar chart
pub const CHART_TOP: usize = 10;

/// Everything a renderer needs to draw one conversation
#[derive(Debug, Clone)]
pub struct RenderView<'a> {
    pub graph: &'a KeywordGraph,
    pub frequencies: FrequencyTable,
    pub statistics: Statistics,
    /// Node positions indexed by node id, in `[-1, 1]`
    pub positions: Vec<Point>,
    /// Most frequent terms, descending
    pub top_terms: Vec<TermCount>,
}

impl<'a> RenderView<'a> {
    pub fn new<S: AsRef<str>>(graph: &'a KeywordGraph, all_keywords: &[S], layout: &SpringLayout) -> Self {
        let frequencies = FrequencyTable::from_keywords(all_keywords);
        let top_terms = frequencies.most_common(CHART_TOP);
        Self {
            graph,
            statistics: summarize(graph, all_keywords),
            positions: layout.positions(graph),
            frequencies,
            top_terms,
        }
    }
}

/// Turns a prepared view into some visual artifact
pub trait GraphRenderer {
    type Artifact;

    fn render(&self, view: &RenderView<'_>) -> Self::Artifact;
}

/// Why nothing was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoMessages,
    NoKeywords,
}

impl SkipReason {
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::NoMessages => "⚠️ Nenhuma mensagem encontrada no chat atual!",
            SkipReason::NoKeywords => "⚠️ Nenhuma palavra-chave relevante encontrada na conversa!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome<A> {
    Rendered(A),
    Skipped(SkipReason),
}

impl<A> RenderOutcome<A> {
    pub fn artifact(self) -> Option<A> {
        match self {
            RenderOutcome::Rendered(artifact) => Some(artifact),
            RenderOutcome::Skipped(_) => None,
        }
    }
}

/// Render a built graph; empty conversations and graphs are skipped with a warning
pub fn render<R, S>(graph: &KeywordGraph, all_keywords: &[S], renderer: &R) -> RenderOutcome<R::Artifact>
where
    R: GraphRenderer,
    S: AsRef<str>,
{
    let skip = if graph.message_count() == 0 {
        Some(SkipReason::NoMessages)
    } else if graph.node_count() == 0 {
        Some(SkipReason::NoKeywords)
    } else {
        None
    };

    if let Some(reason) = skip {
        warn!("{}", reason.message());
        return RenderOutcome::Skipped(reason);
    }

    let view = RenderView::new(graph, all_keywords, &SpringLayout::default());
    debug!(nodes = graph.node_count(), top = view.top_terms.len(), "rendering keyword graph");
    RenderOutcome::Rendered(renderer.render(&view))
}

/// Build and render the graph of a conversation
pub fn render_conversation<R: GraphRenderer>(
    messages: &[Message],
    vocabulary: &Vocabulary,
    renderer: &R,
) -> RenderOutcome<R::Artifact> {
    let (graph, all_keywords) = build_graph(messages, vocabulary);
    render(&graph, &all_keywords, renderer)
}

/// Standalone SVG: graph panel, top-terms bar chart and summary captions
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub panel_width: f64,
    pub panel_height: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            panel_width: 750.0,
            panel_height: 600.0,
        }
    }
}

const MARGIN: f64 = 60.0;
const FOOTER: f64 = 150.0;
/// Node area per occurrence, in px²
const NODE_AREA: f64 = 300.0;

impl SvgRenderer {
    fn node_radius(frequency: usize) -> f64 {
        (frequency.max(1) as f64 * NODE_AREA / std::f64::consts::PI).sqrt()
    }

    fn to_canvas(&self, p: Point) -> (f64, f64) {
        let half_w = (self.panel_width - 2.0 * MARGIN) / 2.0;
        let half_h = (self.panel_height - 2.0 * MARGIN) / 2.0;
        (
            MARGIN + half_w + p.x * half_w,
            MARGIN + 20.0 + half_h + p.y * (half_h - 20.0),
        )
    }

    fn write_graph_panel(&self, out: &mut String, view: &RenderView<'_>) -> fmt::Result {
        writeln!(
            out,
            r#"  <text x="{:.1}" y="30" class="title">Grafo de Palavras-chave</text>"#,
            self.panel_width / 2.0
        )?;
        writeln!(
            out,
            r#"  <text x="{:.1}" y="50" class="subtitle">({} termos encontrados)</text>"#,
            self.panel_width / 2.0,
            view.graph.node_count()
        )?;

        writeln!(out, r#"  <g class="edges">"#)?;
        for edge in view.graph.edges() {
            let (x1, y1) = self.to_canvas(view.positions[edge.from]);
            let (x2, y2) = self.to_canvas(view.positions[edge.to]);
            writeln!(
                out,
                r#"    <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="gray" stroke-width="{:.1}"/>"#,
                x1,
                y1,
                x2,
                y2,
                edge.weight as f64 * 0.5
            )?;
        }
        writeln!(out, "  </g>")?;

        writeln!(out, r#"  <g class="nodes">"#)?;
        for (id, term) in view.graph.nodes().iter().enumerate() {
            let (x, y) = self.to_canvas(view.positions[id]);
            let radius = Self::node_radius(view.frequencies.get(term));
            writeln!(
                out,
                r#"    <circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="lightblue"/>"#,
                x, y, radius
            )?;
            writeln!(
                out,
                r#"    <text x="{:.1}" y="{:.1}" class="label">{}</text>"#,
                x,
                y + 3.0,
                escape_xml(term)
            )?;
        }
        writeln!(out, "  </g>")
    }

    fn write_bar_chart(&self, out: &mut String, view: &RenderView<'_>) -> fmt::Result {
        let left = self.panel_width + 140.0;
        let chart_width = self.panel_width - 140.0 - MARGIN;
        let top = MARGIN + 10.0;
        let row = (self.panel_height - top - MARGIN) / CHART_TOP as f64;
        let max = view.top_terms.first().map(|t| t.count).unwrap_or(1).max(1) as f64;

        writeln!(
            out,
            r#"  <text x="{:.1}" y="30" class="title">Top 10 Palavras-chave</text>"#,
            self.panel_width * 1.5
        )?;

        writeln!(out, r#"  <g class="bars">"#)?;
        for (i, term) in view.top_terms.iter().enumerate() {
            let y = top + i as f64 * row;
            let width = chart_width * term.count as f64 / max;
            writeln!(
                out,
                r#"    <rect class="bar" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="lightcoral"/>"#,
                left,
                y,
                width,
                row * 0.8
            )?;
            writeln!(
                out,
                r#"    <text x="{:.1}" y="{:.1}" class="tick">{}</text>"#,
                left - 8.0,
                y + row * 0.5,
                escape_xml(&term.term)
            )?;
            writeln!(
                out,
                r#"    <text x="{:.1}" y="{:.1}" class="value">{}</text>"#,
                left + width + 6.0,
                y + row * 0.5,
                term.count
            )?;
        }
        writeln!(out, "  </g>")?;

        writeln!(
            out,
            r#"  <text x="{:.1}" y="{:.1}" class="axis">Frequência</text>"#,
            left + chart_width / 2.0,
            self.panel_height - MARGIN / 2.0
        )
    }

    fn write_footer(&self, out: &mut String, view: &RenderView<'_>) -> fmt::Result {
        let stats = &view.statistics;
        let base = self.panel_height + 30.0;
        let column = self.panel_width * 2.0 / 3.0;
        let metrics = [
            ("Palavras-chave únicas", stats.unique_keywords),
            ("Conexões", stats.connections),
            ("Total de ocorrências", stats.total_keyword_occurrences),
        ];

        for (i, (label, value)) in metrics.iter().enumerate() {
            writeln!(
                out,
                r#"  <text x="{:.1}" y="{:.1}" class="metric">{}: {}</text>"#,
                column * i as f64 + 40.0,
                base,
                label,
                value
            )?;
        }

        writeln!(
            out,
            r#"  <text x="40" y="{:.1}" class="subtitle-left">🔍 Palavras-chave mais relevantes:</text>"#,
            base + 30.0
        )?;
        for (i, term) in stats.top_5.iter().enumerate() {
            writeln!(
                out,
                r#"  <text x="60" y="{:.1}" class="caption">• {}: {} ocorrência(s)</text>"#,
                base + 50.0 + i as f64 * 16.0,
                escape_xml(&term.term),
                term.count
            )?;
        }
        Ok(())
    }

    fn write_svg(&self, out: &mut String, view: &RenderView<'_>) -> fmt::Result {
        let width = self.panel_width * 2.0;
        let height = self.panel_height + FOOTER;

        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
            w = width,
            h = height
        )?;
        writeln!(out, "  <style>")?;
        writeln!(out, "    text {{ font-family: sans-serif; }}")?;
        writeln!(out, "    .title {{ font-size: 16px; font-weight: bold; text-anchor: middle; }}")?;
        writeln!(out, "    .subtitle {{ font-size: 13px; text-anchor: middle; }}")?;
        writeln!(out, "    .label {{ font-size: 8px; font-weight: bold; text-anchor: middle; }}")?;
        writeln!(out, "    .tick {{ font-size: 11px; text-anchor: end; dominant-baseline: middle; }}")?;
        writeln!(out, "    .value {{ font-size: 10px; dominant-baseline: middle; }}")?;
        writeln!(out, "    .axis {{ font-size: 12px; text-anchor: middle; }}")?;
        writeln!(out, "    .metric, .subtitle-left {{ font-size: 14px; font-weight: bold; }}")?;
        writeln!(out, "    .caption {{ font-size: 12px; }}")?;
        writeln!(out, "  </style>")?;
        writeln!(out, r#"  <rect width="100%" height="100%" fill="white"/>"#)?;

        self.write_graph_panel(out, view)?;
        self.write_bar_chart(out, view)?;
        self.write_footer(out, view)?;

        writeln!(out, "</svg>")
    }
}

impl GraphRenderer for SvgRenderer {
    type Artifact = String;

    fn render(&self, view: &RenderView<'_>) -> String {
        let mut out = String::new();
        self.write_svg(&mut out, view).expect("writing to a String cannot fail");
        out
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records what it was asked to draw
    struct CountingRenderer;

    impl GraphRenderer for CountingRenderer {
        type Artifact = (usize, Vec<String>);

        fn render(&self, view: &RenderView<'_>) -> Self::Artifact {
            (
                view.positions.len(),
                view.top_terms.iter().map(|t| t.term.clone()).collect(),
            )
        }
    }

    #[test]
    fn test_empty_messages_are_skipped() {
        let outcome = render_conversation(&[], &Vocabulary::default(), &SvgRenderer::default());
        assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::NoMessages));
    }

    #[test]
    fn test_no_keywords_are_skipped() {
        let messages = vec![Message::user("Bom dia!")];
        let outcome = render_conversation(&messages, &Vocabulary::default(), &CountingRenderer);
        assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::NoKeywords));
        assert!(outcome.artifact().is_none());
    }

    #[test]
    fn test_view_top_terms_descending() {
        let messages = vec![
            Message::user("curso curso vestibular"),
            Message::assistant("O vestibular do curso de direito"),
        ];
        let outcome = render_conversation(&messages, &Vocabulary::default(), &CountingRenderer);
        let (positions, top) = outcome.artifact().unwrap();

        assert_eq!(positions, 3);
        assert_eq!(top, vec!["curso", "vestibular", "direito"]);
    }

    #[test]
    fn test_svg_contains_nodes_and_bars() {
        let text = "curso vestibular enem sisu prouni fies nota prova matrícula bolsa campus aula";
        let messages = vec![Message::user(text), Message::assistant("curso e bolsa")];
        let svg = render_conversation(&messages, &Vocabulary::default(), &SvgRenderer::default())
            .artifact()
            .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 12);
        assert_eq!(svg.matches(r#"class="bar""#).count(), CHART_TOP);
        assert!(svg.contains("(12 termos encontrados)"));
        assert!(svg.contains("Conexões: 66"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
