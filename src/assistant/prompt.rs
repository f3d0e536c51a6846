// FAQ system prompt and per-user personalization
use serde::{Deserialize, Serialize};

/// Fixed system prompt of the university FAQ assistant
pub const FAQ_PROMPT: &str = include_str!("faq_prompt.md");

const NOT_INFORMED: &str = "Não informado";

/// What the assistant knows about the person it talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub user_type: String,
    pub ra: String,
    pub course: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Usuário".to_string(),
            user_type: "estudante".to_string(),
            ra: NOT_INFORMED.to_string(),
            course: NOT_INFORMED.to_string(),
        }
    }
}

impl UserProfile {
    /// System prompt followed by the user information block
    pub fn personalized_prompt(&self) -> String {
        format!(
            "{}\n\nInformações do usuário:\n- Nome: {}\n- Tipo de usuário: {}\n- RA: {}\n- Curso: {}\n",
            FAQ_PROMPT.trim_end(),
            self.name,
            title_case(&self.user_type),
            self.ra,
            self.course
        )
    }
}

/// Uppercase the first letter of every word, lowercase the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
