// Keyword co-occurrence graph
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::keywords::extract_keywords;
use crate::transcript::Message;
use crate::vocabulary::Vocabulary;

pub type NodeId = usize;

/// Undirected co-occurrence edge between two keywords, `from < to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: usize,
}

/// Keyword co-occurrence graph
///
/// Nodes are vocabulary terms in first-encounter order. Edges are stored once
/// per unordered pair, oriented from the earlier node.
#[derive(Debug, Clone, Default)]
pub struct KeywordGraph {
    nodes: Vec<String>,
    edges: Vec<KeywordEdge>,
    message_count: usize,
    node_index: HashMap<String, NodeId>,
    edge_index: HashMap<(NodeId, NodeId), usize>,
    /// Per node: (neighbor, edge index) in edge creation order
    adjacency: Vec<Vec<(NodeId, usize)>>,
}

impl KeywordGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node (idempotent)
    pub fn add_node(&mut self, term: &str) -> NodeId {
        if let Some(&id) = self.node_index.get(term) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(term.to_string());
        self.node_index.insert(term.to_string(), id);
        self.adjacency.push(Vec::new());
        id
    }

    /// Increment the weight between two distinct terms, creating the edge with weight 1.
    /// Identical terms are ignored.
    pub fn link(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        let a = self.add_node(a);
        let b = self.add_node(b);
        let (from, to) = (a.min(b), a.max(b));

        match self.edge_index.get(&(from, to)) {
            Some(&idx) => self.edges[idx].weight += 1,
            None => {
                let idx = self.edges.len();
                self.edge_index.insert((from, to), idx);
                self.edges.push(KeywordEdge { from, to, weight: 1 });
                self.adjacency[a].push((b, idx));
                self.adjacency[b].push((a, idx));
            }
        }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Edges in creation order
    pub fn edges(&self) -> &[KeywordEdge] {
        &self.edges
    }

    /// Edges grouped by their earlier node, in node order; within a node,
    /// in the order the node gained each neighbor
    pub fn ordered_edges(&self) -> impl Iterator<Item = &KeywordEdge> + '_ {
        self.adjacency.iter().enumerate().flat_map(move |(id, neighbors)| {
            neighbors
                .iter()
                .filter(move |(other, _)| *other > id)
                .map(move |&(_, idx)| &self.edges[idx])
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of messages the graph was built from
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    pub fn contains(&self, term: &str) -> bool {
        self.node_index.contains_key(term)
    }

    /// Get the term of a node
    pub fn term(&self, id: NodeId) -> &str {
        &self.nodes[id]
    }

    /// Weight between two terms, in either direction
    pub fn weight(&self, a: &str, b: &str) -> Option<usize> {
        let from = *self.node_index.get(a)?;
        let to = *self.node_index.get(b)?;
        let idx = self.edge_index.get(&(from.min(to), from.max(to)))?;
        Some(self.edges[*idx].weight)
    }

    /// Edges as term pairs, in [`ordered_edges`](Self::ordered_edges) order
    pub fn edge_terms(&self) -> impl Iterator<Item = (&str, &str, usize)> + '_ {
        self.ordered_edges()
            .map(move |e| (self.term(e.from), self.term(e.to), e.weight))
    }

    /// Terms connected to `term`
    pub fn neighbors(&self, term: &str) -> Vec<&str> {
        let Some(&id) = self.node_index.get(term) else {
            return Vec::new();
        };
        self.adjacency[id]
            .iter()
            .map(|&(other, _)| self.term(other))
            .collect()
    }
}

/// Build the co-occurrence graph of `messages`
///
/// Every index pair `i < j` of a message's extracted keywords with differing
/// terms adds 1 to that pair's weight, so a term repeated within one message
/// counts once per occurrence. Returns the graph and every extracted keyword
/// in conversation order.
pub fn build_graph(messages: &[Message], vocabulary: &Vocabulary) -> (KeywordGraph, Vec<String>) {
    let mut graph = KeywordGraph::new();
    let mut all_keywords = Vec::new();

    for message in messages {
        let found = extract_keywords(&message.content, vocabulary);

        for (i, first) in found.iter().enumerate() {
            graph.add_node(first);
            for second in &found[i + 1..] {
                graph.link(first, second);
            }
        }

        all_keywords.extend(found);
    }
    graph.message_count = messages.len();

    debug!(
        messages = messages.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        keywords = all_keywords.len(),
        "keyword graph built"
    );

    (graph, all_keywords)
}

/// [`build_graph`] with the built-in vocabulary
pub fn build_graph_default(messages: &[Message]) -> (KeywordGraph, Vec<String>) {
    build_graph(messages, &Vocabulary::default())
}
