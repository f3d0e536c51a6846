// Keyword frequency table and conversation statistics
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

use super::graph::KeywordGraph;

/// Number of terms listed in [`Statistics::top_5`]
pub const SUMMARY_TOP: usize = 5;

/// Term with its total occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// Occurrence count per term, kept in first-encounter order
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<TermCount>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn from_keywords<S: AsRef<str>>(keywords: &[S]) -> Self {
        let mut table = Self::default();
        for keyword in keywords {
            table.add(keyword.as_ref());
        }
        table
    }

    fn add(&mut self, term: &str) {
        match self.index.get(term) {
            Some(&idx) => self.entries[idx].count += 1,
            None => {
                self.index.insert(term.to_string(), self.entries.len());
                self.entries.push(TermCount {
                    term: term.to_string(),
                    count: 1,
                });
            }
        }
    }

    pub fn get(&self, term: &str) -> usize {
        self.index
            .get(term)
            .map(|&idx| self.entries[idx].count)
            .unwrap_or(0)
    }

    /// Distinct terms
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries in first-encounter order
    pub fn iter(&self) -> impl Iterator<Item = &TermCount> {
        self.entries.iter()
    }

    /// Every term by descending count, ties kept in first-encounter order
    pub fn ranked(&self) -> Vec<TermCount> {
        let mut ranked = self.entries.clone();
        // stable sort keeps encounter order on ties
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    /// The `n` most frequent terms
    pub fn most_common(&self, n: usize) -> Vec<TermCount> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.term, &entry.count)?;
        }
        map.end()
    }
}

/// Conversation statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_messages: usize,
    pub unique_keywords: usize,
    pub total_keyword_occurrences: usize,
    pub connections: usize,
    pub most_frequent: Option<TermCount>,
    pub top_5: Vec<TermCount>,
}

/// Summarize a graph and its extracted keyword list
pub fn summarize<S: AsRef<str>>(graph: &KeywordGraph, all_keywords: &[S]) -> Statistics {
    let frequencies = FrequencyTable::from_keywords(all_keywords);
    let top = frequencies.most_common(SUMMARY_TOP);

    Statistics {
        total_messages: graph.message_count(),
        unique_keywords: graph.node_count(),
        total_keyword_occurrences: all_keywords.len(),
        connections: graph.edge_count(),
        most_frequent: top.first().cloned(),
        top_5: top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::graph::build_graph;
    use crate::transcript::Message;
    use crate::vocabulary::Vocabulary;

    #[test]
    fn test_frequency_ties_keep_encounter_order() {
        let table = FrequencyTable::from_keywords(&["enem", "curso", "bolsa", "curso", "bolsa"]);
        let ranked = table.ranked();
        let ranked: Vec<&str> = ranked.iter().map(|t| t.term.as_str()).collect();
        // curso and bolsa tie at 2; curso was seen first
        assert_eq!(ranked, vec!["curso", "bolsa", "enem"]);
        assert_eq!(table.get("curso"), 2);
        assert_eq!(table.get("direito"), 0);
        assert_eq!(table.total(), 5);
    }

    #[test]
    fn test_serialize_keeps_encounter_order() {
        let table = FrequencyTable::from_keywords(&["vestibular", "curso", "vestibular"]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"vestibular":2,"curso":1}"#);
    }

    #[test]
    fn test_summarize_conversation() {
        let vocab = Vocabulary::from_terms(["curso", "vestibular", "enem", "bolsa", "campus", "aula"]);
        let messages = vec![
            Message::user("curso curso vestibular"),
            Message::assistant("O vestibular aceita enem e bolsa, no campus, com aula e curso."),
        ];
        let (graph, keywords) = build_graph(&messages, &vocab);
        let stats = summarize(&graph, &keywords);

        assert_eq!(stats.total_messages, 2);
        assert_eq!(stats.unique_keywords, 6);
        assert_eq!(stats.total_keyword_occurrences, 9);
        assert_eq!(
            stats.most_frequent,
            Some(TermCount {
                term: "curso".to_string(),
                count: 3
            })
        );
        let top: Vec<&str> = stats.top_5.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(top, vec!["curso", "vestibular", "enem", "bolsa", "campus"]);
    }

    #[test]
    fn test_summarize_empty() {
        let (graph, keywords) = build_graph(&[], &Vocabulary::default());
        let stats = summarize(&graph, &keywords);

        assert_eq!(stats.total_messages, 0);
        assert_eq!(stats.unique_keywords, 0);
        assert_eq!(stats.connections, 0);
        assert_eq!(stats.total_keyword_occurrences, 0);
        assert!(stats.most_frequent.is_none());
        assert!(stats.top_5.is_empty());
    }
}
