use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ChatGraphError, Result};
use crate::vocabulary::Vocabulary;

/// Environment variable overriding the configured model
pub const MODEL_ENV: &str = "CAMPUS_CHAT_MODEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: usize,
    /// Name of the environment variable holding the Gemini API key
    pub api_key_env: String,
    pub vocabulary_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_name: "gemini-2.0-flash".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            api_key_env: "GEMINI_API_KEY".to_string(),
            vocabulary_path: None,
        }
    }
}

impl AppConfig {
    /// Load from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| ChatGraphError::io(path, e))?;
                serde_json::from_str(&content).map_err(|e| ChatGraphError::json(path, e))?
            }
            None => Self::default(),
        };

        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                config.model_name = model;
            }
        }

        debug!(model = %config.model_name, "configuration loaded");
        Ok(config)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ChatGraphError::MissingApiKey(self.api_key_env.clone()))
    }

    /// Vocabulary from `override_path`, else from the configured path, else the built-in one
    pub fn vocabulary(&self, override_path: Option<&Path>) -> Result<Vocabulary> {
        match override_path.or(self.vocabulary_path.as_deref()) {
            Some(path) => Vocabulary::load(path),
            None => Ok(Vocabulary::default()),
        }
    }
}
