//! Configuration types, built from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Gemini API settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key, kept out of Debug output.
    pub api_key: SecretString,
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Base URL of the generative language API.
    pub base_url: String,
    /// Hard timeout for a single generation call.
    pub timeout: Duration,
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Path to the libSQL database file.
    pub db_path: PathBuf,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// `GEMINI_API_KEY` is required; everything else has defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let model = std::env::var("FUNNELCRAFT_MODEL")
            .unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let base_url = std::env::var("FUNNELCRAFT_GEMINI_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        let port: u16 = parse_env("PORT", 3000)?;

        let db_path = std::env::var("FUNNELCRAFT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/funnelcraft.db"));

        let timeout_secs: u64 = parse_env("FUNNELCRAFT_GENERATION_TIMEOUT_SECS", 30)?;

        Ok(Self {
            port,
            db_path,
            gemini: GeminiConfig {
                api_key: SecretString::from(api_key),
                model,
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

/// Parse an optional env var, falling back to a default when unset.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
