use std::time::Duration;

use anyhow::{ensure, Context, Result};

const DEFAULT_LLM_API_URL: &str = "http://localhost:1234/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "mistral-7b-instruct-v0.3:2";

/// Application configuration loaded from environment variables.
/// Every variable has a default except `REDIS_URL`, whose absence selects in-memory storage.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_timeout: Duration,
    pub redis_url: Option<String>,
    pub extra_keywords: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_temperature = env_or("LLM_TEMPERATURE", "0.7")
            .parse::<f32>()
            .context("LLM_TEMPERATURE must be a number")?;
        ensure!(
            (0.0..=2.0).contains(&llm_temperature),
            "LLM_TEMPERATURE must be between 0 and 2, got {llm_temperature}"
        );

        let timeout_secs = env_or("LLM_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?;
        ensure!(timeout_secs > 0, "LLM_TIMEOUT_SECS must be positive");

        Ok(Config {
            llm_api_url: env_or("LLM_API_URL", DEFAULT_LLM_API_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            llm_temperature,
            llm_timeout: Duration::from_secs(timeout_secs),
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            extra_keywords: parse_keyword_list(&env_or("EXTRA_KEYWORDS", "")),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_list() {
        assert_eq!(
            parse_keyword_list(" rust, kubernetes ,,terraform "),
            vec!["rust", "kubernetes", "terraform"]
        );
        assert!(parse_keyword_list("").is_empty());
    }
}
