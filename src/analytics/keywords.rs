// Keyword extraction
use regex::Regex;
use std::sync::OnceLock;

use crate::vocabulary::Vocabulary;

fn punctuation() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    PUNCTUATION.get_or_init(|| Regex::new(r"[^\p{L}\p{N}_\s]").expect("valid punctuation pattern"))
}

/// Lowercase and strip every character that is not a letter, digit, underscore or whitespace
pub fn normalize(text: &str) -> String {
    punctuation().replace_all(&text.to_lowercase(), "").into_owned()
}

/// Extract the tokens of `content` that belong to `vocabulary`, in order, duplicates kept
pub fn extract_keywords(content: &str, vocabulary: &Vocabulary) -> Vec<String> {
    normalize(content)
        .split_whitespace()
        .filter(|token| vocabulary.contains(token))
        .map(str::to_string)
        .collect()
}
