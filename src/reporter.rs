use colored::*;

use crate::analytics::graph::KeywordGraph;
use crate::analytics::stats::{FrequencyTable, Statistics};

/// Bars in the console frequency chart are at most this wide
const BAR_WIDTH: usize = 30;

/// Print conversation statistics and the top terms as a console bar chart
pub fn print_report(graph: &KeywordGraph, frequencies: &FrequencyTable, stats: &Statistics) {
    println!("\n{}", "📊 Análise de palavras-chave".bold());
    println!("{}", "━".repeat(50));
    println!();
    println!("💬 Mensagens: {}", stats.total_messages);
    println!("🔑 Palavras-chave únicas: {}", stats.unique_keywords);
    println!("🔗 Conexões: {}", stats.connections);
    println!("📈 Total de ocorrências: {}", stats.total_keyword_occurrences);
    println!();

    match &stats.most_frequent {
        Some(top) => println!(
            "{} {} ({} ocorrência(s))",
            "[Mais frequente]".green().bold(),
            top.term,
            top.count
        ),
        None => {
            println!("{}", "⚠️ Nenhuma palavra-chave relevante encontrada na conversa!".yellow());
            return;
        }
    }
    println!();

    let top = frequencies.most_common(10);
    let max = top.first().map(|t| t.count).unwrap_or(1).max(1);
    let label_width = top.iter().map(|t| t.term.chars().count()).max().unwrap_or(0);

    println!("{}", "Top 10 Palavras-chave".bold());
    for entry in &top {
        let len = (entry.count * BAR_WIDTH).div_ceil(max);
        let padding = label_width - entry.term.chars().count();
        println!(
            "{}{} │{} {}",
            " ".repeat(padding),
            entry.term,
            "█".repeat(len).red(),
            entry.count
        );
    }
    println!();

    let hubs = strongest_links(graph, 5);
    if !hubs.is_empty() {
        println!("{}", "Conexões mais fortes".bold());
        for (a, b, weight) in hubs {
            println!("├─ {} ↔ {} (peso {})", a, b, weight);
        }
        println!();
    }
}

/// Heaviest edges, ties kept in edge order
fn strongest_links(graph: &KeywordGraph, n: usize) -> Vec<(&str, &str, usize)> {
    let mut links: Vec<_> = graph.edge_terms().collect();
    links.sort_by(|a, b| b.2.cmp(&a.2));
    links.truncate(n);
    links
}
