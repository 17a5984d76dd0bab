//! Error types for funnelcraft.

use std::time::Duration;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Generation-provider errors.
///
/// A too-short-but-successful completion is not an error — the acceptance
/// gate in the wizard and assembler handles that case.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Generation request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Invalid response from provider: {reason}")]
    InvalidResponse { reason: String },

    #[error("Generation call timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Provider API key is not configured")]
    MissingApiKey,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Wizard input errors, rejected before any external call.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step {step} is outside the valid range 1-17")]
    InvalidStep { step: i64 },
}

/// Outbound email errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    SendFailed(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
