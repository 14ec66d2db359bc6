//! LLM request/response types for Tutoria.
//!
//! These types model the data shapes for provider interactions: the
//! conversation messages the generator reads, the provider-facing turn
//! format, and the two error layers (raw provider failures and the
//! caller-facing generation taxonomy).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in a stored conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Role of a prior turn as the provider understands it.
///
/// The provider calls the assistant side of the conversation `model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Model => write!(f, "model"),
        }
    }
}

/// A prior conversation turn in provider shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTurn {
    pub role: TurnRole,
    pub content: String,
}

/// Fixed sampling parameters sent with every provider call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// One chat-completion call to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier selected for this attempt.
    pub model: String,
    /// Prior turns, oldest first. Excludes the new user message.
    pub history: Vec<ProviderTurn>,
    /// The new user turn.
    pub message: String,
    /// System instruction text.
    pub system_instruction: String,
    pub config: GenerationConfig,
}

/// Scope of a rate-limit rejection, read from the provider's structured
/// error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitScope {
    /// A short-window limit (per minute, or with a suggested retry delay).
    Transient,
    /// A long-window quota (per day) that will not clear within one request.
    Exhausted,
}

/// Raw failure reported by a provider call.
///
/// Carries whatever structured signal the provider gave us. Mapping these
/// onto [`GenerateError`] is the generator's job, not the provider's.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    /// The provider answered with a structured error body.
    #[error("provider API error ({}): {message}", .status.as_deref().unwrap_or("no status"))]
    Api {
        http_status: Option<u16>,
        /// Provider status string, e.g. `UNAVAILABLE` or `RESOURCE_EXHAUSTED`.
        status: Option<String>,
        message: String,
        /// Which limit a rate-limit error hit, when the error body says so.
        rate_limit: Option<RateLimitScope>,
    },

    /// The provider's safety filter rejected the prompt or the candidate.
    #[error("content blocked by provider: {reason}")]
    Blocked { reason: String },

    /// Network-level failure with no structured signal.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Caller-facing outcome taxonomy for a generation request.
///
/// Exactly one of these (or success text) is returned per top-level call;
/// intermediate retries are invisible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid history: {0}")]
    InvalidHistory(String),

    #[error("provider configuration error: {0}")]
    ConfigurationError(String),

    #[error("provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("content blocked: {0}")]
    ContentBlocked(String),

    #[error("model '{model}' unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    #[error("provider busy after {attempts} attempts: {message}")]
    ProviderBusy { attempts: u32, message: String },

    #[error("provider error: {0}")]
    UnknownProviderError(String),

    #[error("generation deadline of {deadline_ms}ms exceeded")]
    DeadlineExceeded { deadline_ms: u64 },

    #[error("generation cancelled")]
    Cancelled,
}
