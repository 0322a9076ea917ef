use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent key disables the AI endpoints (they answer 503) instead of failing startup.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub llm_timeout_secs: u64,
    pub session_dir: PathBuf,
    pub session_ttl_hours: i64,
    pub max_upload_bytes: usize,
    pub max_review_chars: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: optional_env("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 60)?,
            session_dir: optional_env("SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./sessions")),
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", 24)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            max_review_chars: parse_env("MAX_REVIEW_CHARS", 20_000)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler tests; never touches the process environment.
    pub fn for_tests(session_dir: PathBuf) -> Self {
        Config {
            openai_api_key: Some("test-key".to_string()),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            llm_timeout_secs: 5,
            session_dir,
            session_ttl_hours: 24,
            max_upload_bytes: 1024,
            max_review_chars: 20_000,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("RESUME_STUDIO_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("RESUME_STUDIO_TEST_BAD_NUMBER", "not-a-number");
        let result: Result<u64> = parse_env("RESUME_STUDIO_TEST_BAD_NUMBER", 1);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("RESUME_STUDIO_TEST_BAD_NUMBER"));
    }

    #[test]
    fn test_blank_optional_env_is_none() {
        std::env::set_var("RESUME_STUDIO_TEST_BLANK", "   ");
        assert!(optional_env("RESUME_STUDIO_TEST_BLANK").is_none());
    }
}
