// University FAQ assistant backed by a hosted LLM

pub mod conversation;
pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

use crate::transcript::Message;

pub use conversation::Conversation;
pub use gemini::GeminiClient;
pub use prompt::{UserProfile, FAQ_PROMPT};

/// Opaque text-in, text-out chat model
#[async_trait]
pub trait ChatAgent: Send + Sync {
    async fn reply(
        &self,
        system_prompt: &str,
        history: &[Message],
        question: &str,
    ) -> crate::Result<String>;
}
