// Chat transcript model and loading
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ChatGraphError, Result};

/// Chat names are cut to this many characters of the first message
const CHAT_NAME_CHARS: usize = 30;

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label shown in formatted histories
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Usuário",
            Role::Assistant => "Assistente",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One stored question/answer exchange, as kept by the chat front end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "chatId")]
    pub chat_id: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "userMessage")]
    pub user_message: String,
    #[serde(rename = "AiMessage")]
    pub ai_message: String,
    #[serde(default)]
    pub deleted: bool,
}

/// A conversation recovered from a transcript file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub name: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// All chats of a transcript file, in order of first appearance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub chats: Vec<Chat>,
}

impl Transcript {
    /// Load and group a transcript file, keeping only `user`'s chats when given
    pub fn load(path: &Path, user: Option<&str>) -> Result<Self> {
        Ok(TranscriptFile::load(path)?.to_transcript(user))
    }

    /// Get chat by id
    pub fn chat(&self, id: &str) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == id)
    }

    /// Messages of every chat, chats concatenated in order
    pub fn all_messages(&self) -> Vec<Message> {
        self.chats
            .iter()
            .flat_map(|c| c.messages.iter().cloned())
            .collect()
    }

    /// Messages of one chat when `chat_id` is given, otherwise of all chats
    pub fn select(&self, chat_id: Option<&str>) -> Option<Vec<Message>> {
        match chat_id {
            Some(id) => self.chat(id).map(|c| c.messages.clone()),
            None => Some(self.all_messages()),
        }
    }
}

/// On-disk transcript, in one of the two supported layouts
#[derive(Debug, Clone)]
pub enum TranscriptFile {
    /// Plain array of `{role, content}` objects
    Messages(Vec<Message>),
    /// Array of stored question/answer records
    Records(Vec<HistoryRecord>),
}

impl TranscriptFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ChatGraphError::io(path, e))?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| ChatGraphError::json(path, e))?;

        if let Ok(messages) = serde_json::from_value::<Vec<Message>>(value.clone()) {
            debug!(path = %path.display(), messages = messages.len(), "message transcript loaded");
            return Ok(TranscriptFile::Messages(messages));
        }

        match serde_json::from_value::<Vec<HistoryRecord>>(value) {
            Ok(records) => {
                debug!(path = %path.display(), records = records.len(), "history records loaded");
                Ok(TranscriptFile::Records(records))
            }
            Err(_) => Err(ChatGraphError::TranscriptLayout(path.to_path_buf())),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match self {
            TranscriptFile::Messages(messages) => serde_json::to_string_pretty(messages),
            TranscriptFile::Records(records) => serde_json::to_string_pretty(records),
        }
        .map_err(|e| ChatGraphError::json(path, e))?;
        std::fs::write(path, content).map_err(|e| ChatGraphError::io(path, e))
    }

    /// Append a question/answer exchange
    ///
    /// Records without an explicit `user` inherit the user of the chat's
    /// earlier records.
    pub fn push_exchange(&mut self, chat_id: &str, user: Option<&str>, question: &str, answer: &str) {
        match self {
            TranscriptFile::Messages(messages) => {
                messages.push(Message::user(question));
                messages.push(Message::assistant(answer));
            }
            TranscriptFile::Records(records) => {
                let user_id = match user {
                    Some(user) => user.to_string(),
                    None => records
                        .iter()
                        .find(|r| r.chat_id == chat_id)
                        .map(|r| r.user_id.clone())
                        .unwrap_or_default(),
                };
                records.push(HistoryRecord {
                    timestamp: Some(Utc::now()),
                    chat_id: chat_id.to_string(),
                    user_id,
                    user_message: question.to_string(),
                    ai_message: answer.to_string(),
                    deleted: false,
                });
            }
        }
    }

    /// Soft-delete a chat by flagging its records; returns how many were flagged
    ///
    /// Plain message files carry no deletion flag, so nothing changes there.
    pub fn delete_chat(&mut self, chat_id: &str) -> usize {
        let TranscriptFile::Records(records) = self else {
            return 0;
        };
        let mut flagged = 0;
        for record in records.iter_mut().filter(|r| r.chat_id == chat_id && !r.deleted) {
            record.deleted = true;
            flagged += 1;
        }
        debug!(chat = chat_id, flagged, "chat marked as deleted");
        flagged
    }

    /// Group into chats
    ///
    /// A plain message file becomes a single chat with id `default` and has
    /// no user to filter on. Records flagged as deleted or belonging to
    /// another user are skipped; the rest are ordered by timestamp (records
    /// without one first) and grouped by chat id.
    pub fn to_transcript(&self, user: Option<&str>) -> Transcript {
        match self {
            TranscriptFile::Messages(messages) => {
                if messages.is_empty() {
                    return Transcript::default();
                }
                Transcript {
                    chats: vec![Chat {
                        id: "default".to_string(),
                        name: chat_name(&messages[0].content),
                        messages: messages.clone(),
                        created_at: None,
                    }],
                }
            }
            TranscriptFile::Records(records) => group_records(records, user),
        }
    }
}

fn group_records(records: &[HistoryRecord], user: Option<&str>) -> Transcript {
    let owned: Vec<&HistoryRecord> = records
        .iter()
        .filter(|r| user.map_or(true, |u| r.user_id == u))
        .collect();
    let mut live: Vec<&HistoryRecord> = owned.iter().copied().filter(|r| !r.deleted).collect();
    let skipped = owned.len() - live.len();
    if skipped > 0 {
        warn!(skipped, "deleted history records ignored");
    }
    live.sort_by_key(|r| r.timestamp);

    let mut chats: Vec<Chat> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in live {
        let idx = *index.entry(record.chat_id.as_str()).or_insert_with(|| {
            chats.push(Chat {
                id: record.chat_id.clone(),
                name: format!("Chat {}", chats.len() + 1),
                messages: Vec::new(),
                created_at: record.timestamp,
            });
            chats.len() - 1
        });

        let chat = &mut chats[idx];
        chat.messages.push(Message::user(record.user_message.as_str()));
        chat.messages.push(Message::assistant(record.ai_message.as_str()));
    }

    for chat in &mut chats {
        if let Some(first) = chat.messages.first() {
            chat.name = chat_name(&first.content);
        }
    }

    Transcript { chats }
}

/// First characters of a message, with `...` when cut
pub fn chat_name(first_message: &str) -> String {
    if first_message.chars().count() > CHAT_NAME_CHARS {
        let head: String = first_message.chars().take(CHAT_NAME_CHARS).collect();
        format!("{}...", head)
    } else {
        first_message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_message_array() {
        let file = write_temp(
            r#"[{"role": "user", "content": "Qual é o vestibular?"},
                {"role": "assistant", "content": "O vestibular ocorre em junho."}]"#,
        );

        let transcript = Transcript::load(file.path(), None).unwrap();
        assert_eq!(transcript.chats.len(), 1);
        assert_eq!(transcript.chats[0].id, "default");
        assert_eq!(transcript.chats[0].messages[1].role, Role::Assistant);
        assert_eq!(transcript.all_messages().len(), 2);
    }

    #[test]
    fn test_group_history_records() {
        let file = write_temp(
            r#"[
              {"timestamp": "2025-03-01T10:00:00Z", "chatId": "a1", "userId": "u", "userMessage": "Onde fica a biblioteca do campus principal?", "AiMessage": "No prédio central.", "deleted": false},
              {"timestamp": "2025-03-01T10:05:00Z", "chatId": "b2", "userId": "u", "userMessage": "Boleto", "AiMessage": "Pelo portal.", "deleted": true},
              {"timestamp": "2025-03-01T10:02:00Z", "chatId": "a1", "userId": "u", "userMessage": "E o horário?", "AiMessage": "Das 8h às 22h."},
              {"timestamp": "2025-03-02T09:00:00Z", "chatId": "c3", "userId": "u", "userMessage": "Enem", "AiMessage": "Aceitamos a nota."}
            ]"#,
        );

        let transcript = Transcript::load(file.path(), None).unwrap();
        assert_eq!(transcript.chats.len(), 2);

        let first = &transcript.chats[0];
        assert_eq!(first.id, "a1");
        assert_eq!(first.messages.len(), 4);
        assert_eq!(first.messages[2].content, "E o horário?");
        assert_eq!(first.name, "Onde fica a biblioteca do camp...");

        assert_eq!(transcript.chats[1].name, "Enem");
        assert!(transcript.chat("b2").is_none());
        assert_eq!(transcript.select(Some("c3")).unwrap().len(), 2);
        assert!(transcript.select(Some("zz")).is_none());
    }

    #[test]
    fn test_unrecognized_layout() {
        let file = write_temp(r#"{"messages": []}"#);
        let result = Transcript::load(file.path(), None);
        assert!(matches!(result, Err(ChatGraphError::TranscriptLayout(_))));
    }

    #[test]
    fn test_push_exchange_and_save() {
        let file = write_temp(r#"[{"role": "user", "content": "Oi"}]"#);

        let mut transcript_file = TranscriptFile::load(file.path()).unwrap();
        transcript_file.push_exchange("default", None, "Tem estacionamento?", "Sim.");
        transcript_file.save(file.path()).unwrap();

        let reloaded = Transcript::load(file.path(), None).unwrap();
        let messages = reloaded.all_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], Message::assistant("Sim."));
    }

    const TWO_USERS: &str = r#"[
      {"timestamp": "2025-03-01T10:00:00Z", "chatId": "a1", "userId": "ana", "userMessage": "Curso de direito", "AiMessage": "Noturno."},
      {"timestamp": "2025-03-01T11:00:00Z", "chatId": "b2", "userId": "bia", "userMessage": "Bolsa", "AiMessage": "Via ProUni."},
      {"timestamp": "2025-03-01T12:00:00Z", "chatId": "a1", "userId": "ana", "userMessage": "E o vestibular?", "AiMessage": "Em junho."},
      {"timestamp": "2025-03-02T08:00:00Z", "chatId": "c3", "userId": "ana", "userMessage": "Biblioteca", "AiMessage": "Prédio 5."}
    ]"#;

    #[test]
    fn test_filter_by_user() {
        let file = write_temp(TWO_USERS);

        let ana = Transcript::load(file.path(), Some("ana")).unwrap();
        let ids: Vec<&str> = ana.chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "c3"]);
        assert_eq!(ana.all_messages().len(), 6);

        let bia = Transcript::load(file.path(), Some("bia")).unwrap();
        assert_eq!(bia.chats.len(), 1);
        assert_eq!(bia.chats[0].messages[0].content, "Bolsa");

        assert!(Transcript::load(file.path(), Some("caio")).unwrap().chats.is_empty());
        assert_eq!(Transcript::load(file.path(), None).unwrap().chats.len(), 3);
    }

    #[test]
    fn test_delete_chat_flags_records() {
        let file = write_temp(TWO_USERS);

        let mut stored = TranscriptFile::load(file.path()).unwrap();
        assert_eq!(stored.delete_chat("a1"), 2);
        assert_eq!(stored.delete_chat("a1"), 0);
        assert_eq!(stored.delete_chat("zz"), 0);
        stored.save(file.path()).unwrap();

        let reloaded = TranscriptFile::load(file.path()).unwrap();
        let TranscriptFile::Records(records) = &reloaded else {
            panic!("expected history records");
        };
        assert_eq!(records.len(), 4);
        assert_eq!(records.iter().filter(|r| r.deleted).count(), 2);

        let transcript = reloaded.to_transcript(Some("ana"));
        let ids: Vec<&str> = transcript.chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c3"]);
    }

    #[test]
    fn test_delete_in_message_file_is_noop() {
        let mut stored = TranscriptFile::Messages(vec![Message::user("Oi")]);
        assert_eq!(stored.delete_chat("default"), 0);
        assert_eq!(stored.to_transcript(None).chats.len(), 1);
    }

    #[test]
    fn test_push_exchange_records_user() {
        let mut stored = TranscriptFile::Records(Vec::new());
        stored.push_exchange("n1", Some("ana"), "Tem estágio?", "Sim.");
        stored.push_exchange("n1", None, "Remunerado?", "Depende.");

        let TranscriptFile::Records(records) = &stored else {
            panic!("expected history records");
        };
        assert!(records.iter().all(|r| r.user_id == "ana"));
        assert_eq!(stored.to_transcript(Some("ana")).chats[0].messages.len(), 4);
    }

    #[test]
    fn test_chat_name_counts_chars() {
        let name = chat_name(&"é".repeat(31));
        assert_eq!(name.chars().count(), 33);
        assert!(name.ends_with("..."));
    }
}
