// Conversation with memory on top of a chat agent
use tracing::warn;

use super::prompt::UserProfile;
use super::ChatAgent;
use crate::transcript::Message;

/// Characters of a message shown in formatted history
const PREVIEW_CHARS: usize = 100;

/// A personalized conversation that keeps its own history
pub struct Conversation<A: ChatAgent> {
    agent: A,
    system_prompt: String,
    history: Vec<Message>,
}

impl<A: ChatAgent> Conversation<A> {
    pub fn new(agent: A, profile: &UserProfile) -> Self {
        Self {
            agent,
            system_prompt: profile.personalized_prompt(),
            history: Vec::new(),
        }
    }

    /// Start from earlier messages
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Ask a question; agent failures come back as the reply text and are not remembered
    pub async fn send(&mut self, question: &str) -> String {
        let result = self
            .agent
            .reply(&self.system_prompt, &self.history, question)
            .await;

        match result {
            Ok(answer) => {
                self.history.push(Message::user(question));
                self.history.push(Message::assistant(answer.as_str()));
                answer
            }
            Err(e) => {
                warn!(error = %e, "assistant reply failed");
                format!("Erro ao processar mensagem: {}", e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Numbered history with role labels, long messages cut
    pub fn formatted_history(&self) -> String {
        if self.history.is_empty() {
            return "📝 Nenhuma mensagem no histórico".to_string();
        }

        self.history
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let content = if m.content.chars().count() > PREVIEW_CHARS {
                    let head: String = m.content.chars().take(PREVIEW_CHARS).collect();
                    format!("{}...", head)
                } else {
                    m.content.clone()
                };
                format!("{}. {}: {}", i + 1, m.role.label(), content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatGraphError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers from a script and records the history length it was given
    struct ScriptedAgent {
        answers: Mutex<Vec<crate::Result<String>>>,
        seen_history: Mutex<Vec<usize>>,
    }

    impl ScriptedAgent {
        fn new(answers: Vec<crate::Result<String>>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().rev().collect()),
                seen_history: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatAgent for ScriptedAgent {
        async fn reply(
            &self,
            system_prompt: &str,
            history: &[Message],
            _question: &str,
        ) -> crate::Result<String> {
            assert!(system_prompt.contains("Informações do usuário"));
            self.seen_history.lock().unwrap().push(history.len());
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("...".to_string()))
        }
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_send_keeps_memory() {
        let agent = ScriptedAgent::new(vec![
            Ok("O vestibular é em junho.".to_string()),
            Ok("Sim, pelo enem.".to_string()),
        ]);
        let mut conversation = Conversation::new(agent, &UserProfile::default());

        let first = block_on(conversation.send("Quando é o vestibular?"));
        let second = block_on(conversation.send("Aceita enem?"));

        assert_eq!(first, "O vestibular é em junho.");
        assert_eq!(second, "Sim, pelo enem.");
        assert_eq!(conversation.history().len(), 4);
        assert_eq!(*conversation.agent.seen_history.lock().unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_failure_becomes_reply_text() {
        let agent = ScriptedAgent::new(vec![Err(ChatGraphError::Llm("quota exceeded".to_string()))]);
        let mut conversation = Conversation::new(agent, &UserProfile::default());

        let reply = block_on(conversation.send("Oi"));
        assert_eq!(reply, "Erro ao processar mensagem: LLM API error: quota exceeded");
        assert!(conversation.history().is_empty());
    }

    #[test]
    fn test_formatted_history() {
        let agent = ScriptedAgent::new(vec![]);
        let mut conversation = Conversation::new(agent, &UserProfile::default());
        assert_eq!(conversation.formatted_history(), "📝 Nenhuma mensagem no histórico");

        conversation = conversation.with_history(vec![
            Message::user("Oi"),
            Message::assistant("a".repeat(120)),
        ]);
        let formatted = conversation.formatted_history();
        let lines: Vec<&str> = formatted.lines().collect();

        assert_eq!(lines[0], "1. Usuário: Oi");
        assert_eq!(lines[1], format!("2. Assistente: {}...", "a".repeat(100)));

        conversation.clear();
        assert!(conversation.history().is_empty());
    }
}
