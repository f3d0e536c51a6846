// Gemini API client
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::ChatAgent;
use crate::config::AppConfig;
use crate::error::ChatGraphError;
use crate::transcript::{Message, Role};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let defaults = AppConfig::default();
        Self {
            api_key,
            model: defaults.model_name,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            client: reqwest::Client::new(),
        }
    }

    /// Client for the configured model, with the API key read from the environment
    pub fn from_config(config: &AppConfig) -> crate::Result<Self> {
        let mut client = Self::new(config.api_key()?).with_model(config.model_name.clone());
        client.temperature = config.temperature;
        client.max_tokens = config.max_tokens;
        Ok(client)
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Simple text generation without system prompt or history
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_contents(None, vec![Content::text(Some("user"), prompt)])
            .await
    }

    fn build_contents(history: &[Message], question: &str) -> Vec<Content> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                Content::text(Some(role), &m.content)
            })
            .collect();
        contents.push(Content::text(Some("user"), question));
        contents
    }

    async fn generate_with_contents(
        &self,
        system_prompt: Option<&str>,
        contents: Vec<Content>,
    ) -> Result<String> {
        let start = Instant::now();
        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE,
            self.model,
            urlencoding::encode(&self.api_key)
        );

        info!(model = %self.model, turns = contents.len(), "calling Gemini API");

        let request = GeminiRequest {
            system_instruction: system_prompt.map(|s| Content::text(None, s)),
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Gemini API request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        let text: String = gemini_response
            .candidates
            .first()
            .context("Gemini API returned no candidates")?
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            anyhow::bail!("Gemini API returned an empty response");
        }

        debug!(
            chars = text.chars().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Gemini response received"
        );
        Ok(text)
    }
}

#[async_trait]
impl ChatAgent for GeminiClient {
    async fn reply(
        &self,
        system_prompt: &str,
        history: &[Message],
        question: &str,
    ) -> crate::Result<String> {
        let contents = Self::build_contents(history, question);
        self.generate_with_contents(Some(system_prompt), contents)
            .await
            .map_err(|e| ChatGraphError::Llm(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let history = vec![Message::user("Oi"), Message::assistant("Olá! Como posso ajudar?")];
        let request = GeminiRequest {
            system_instruction: Some(Content::text(None, "Você é um assistente")),
            contents: GeminiClient::build_contents(&history, "Tem vestibular?"),
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2048,
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Você é um assistente");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][2]["parts"][0]["text"], "Tem vestibular?");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_response_parsing_joins_parts() {
        let raw = r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "Olá, "}, {"text": "Ana!"}]}}]}"#;
        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        let text: String = response.candidates[0]
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        assert_eq!(text, "Olá, Ana!");
    }

    #[test]
    fn test_from_config_uses_model() {
        std::env::set_var("CAMPUS_CHAT_GRAPH_TEST_KEY", "abc");
        let config = AppConfig {
            model_name: "gemini-test".to_string(),
            api_key_env: "CAMPUS_CHAT_GRAPH_TEST_KEY".to_string(),
            ..AppConfig::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "gemini-test");
    }

    #[test]
    #[ignore]
    fn test_gemini_client() {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap();
        let client = GeminiClient::new(api_key);
        let rt = tokio::runtime::Runtime::new().unwrap();
        let response = rt.block_on(client.generate("Olá")).unwrap();
        assert!(!response.is_empty());
    }
}
