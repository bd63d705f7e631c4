use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 2200;
const MONGODB_DATABASE: &str = "Itineraries";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_MODEL: &str = "gpt-4o-mini";
const OPENAI_MAX_TOKENS: u32 = 5000;
const OPENAI_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}`")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// No URI means the in-memory store.
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    /// No API key means generation requests fail with a 500.
    pub openai: Option<OpenAiConfig>,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match non_empty(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = non_empty("HOST").unwrap_or_else(|| HOST.to_string());
        let port = parsed("PORT", PORT)?;

        let mongodb_uri = non_empty("MONGODB_URI");
        let mongodb_database =
            non_empty("MONGODB_DATABASE").unwrap_or_else(|| MONGODB_DATABASE.to_string());

        let openai = match non_empty("OPENAI_API_KEY") {
            Some(api_key) => Some(OpenAiConfig {
                api_key,
                base_url: non_empty("OPENAI_BASE_URL")
                    .unwrap_or_else(|| OPENAI_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: non_empty("OPENAI_MODEL").unwrap_or_else(|| OPENAI_MODEL.to_string()),
                max_tokens: parsed("OPENAI_MAX_TOKENS", OPENAI_MAX_TOKENS)?,
                timeout: Duration::from_secs(parsed("OPENAI_TIMEOUT_SECS", OPENAI_TIMEOUT_SECS)?),
            }),
            None => None,
        };

        Ok(Self {
            host,
            port,
            mongodb_uri,
            mongodb_database,
            openai,
        })
    }
}
