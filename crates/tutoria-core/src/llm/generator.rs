//! Response generator for tutoring conversations.
//!
//! ResponseGenerator turns a stored conversation plus an optional learner
//! profile into one assistant reply. It windows the history, assembles the
//! system instruction, and drives a bounded retry loop over the configured
//! model fallback list. The whole loop runs under an explicit deadline and
//! stops as soon as the caller's cancellation token fires.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use tutoria_types::config::GeneratorConfig;
use tutoria_types::error::ConfigError;
use tutoria_types::llm::{
    ChatRequest, GenerateError, GenerationConfig, Message, MessageRole, ProviderTurn,
};
use tutoria_types::profile::UserProfile;

use super::context::{to_provider_turns, window};
use super::prompt::build_system_instruction;
use super::provider::LlmProvider;
use super::retry::{Classification, MAX_RETRIES, backoff_delay, classify, select_model};

/// Default upper bound on one `generate` call, retries and backoff included.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(90);

/// Static settings for a [`ResponseGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Fallback list, cheapest first. Never empty.
    pub models: Vec<String>,
    pub generation: GenerationConfig,
    pub deadline: Duration,
}

impl GeneratorSettings {
    /// Build settings with the default generation config and deadline.
    pub fn new(models: Vec<String>) -> Result<Self, ConfigError> {
        Self::validated(models, GenerationConfig::default(), DEFAULT_DEADLINE)
    }

    /// Build settings from the `[generator]` config section.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        Self::validated(
            config.models.clone(),
            GenerationConfig {
                max_output_tokens: config.max_output_tokens,
                temperature: config.temperature,
            },
            Duration::from_secs(config.deadline_secs),
        )
    }

    fn validated(
        models: Vec<String>,
        generation: GenerationConfig,
        deadline: Duration,
    ) -> Result<Self, ConfigError> {
        let models: Vec<String> = models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        if models.is_empty() {
            return Err(ConfigError::Invalid(
                "generator.models must list at least one model".to_string(),
            ));
        }
        if deadline.is_zero() {
            return Err(ConfigError::Invalid(
                "generator.deadline_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            models,
            generation,
            deadline,
        })
    }
}

/// Provider-ready view of a conversation: everything but the model name.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedConversation {
    pub history: Vec<ProviderTurn>,
    pub message: String,
    pub system_instruction: String,
}

/// Validate, window and convert a history for one provider call.
///
/// Fails with `InvalidHistory` when the history is empty or does not end
/// with a user message.
pub fn prepare(
    history: &[Message],
    profile: Option<&UserProfile>,
) -> Result<PreparedConversation, GenerateError> {
    let Some(last) = history.last() else {
        return Err(GenerateError::InvalidHistory(
            "history is empty".to_string(),
        ));
    };
    if last.role != MessageRole::User {
        return Err(GenerateError::InvalidHistory(format!(
            "last message must come from the user, got '{}'",
            last.role
        )));
    }

    let windowed = window(history);

    Ok(PreparedConversation {
        history: to_provider_turns(windowed),
        message: last.content.clone(),
        system_instruction: build_system_instruction(profile),
    })
}

/// Generates assistant replies through an injected [`LlmProvider`].
///
/// Holds no per-call state; one instance is shared by every request.
pub struct ResponseGenerator<P: LlmProvider> {
    provider: P,
    settings: GeneratorSettings,
}

impl<P: LlmProvider> ResponseGenerator<P> {
    pub fn new(provider: P, settings: GeneratorSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Generate the next assistant reply for `history`.
    ///
    /// Returns the provider's text verbatim. Intermediate retries are not
    /// visible to the caller; exactly one outcome is returned.
    pub async fn generate(
        &self,
        history: &[Message],
        profile: Option<&UserProfile>,
    ) -> Result<String, GenerateError> {
        self.generate_with_cancel(history, profile, &CancellationToken::new())
            .await
    }

    /// Like [`generate`](Self::generate), but gives up with
    /// `GenerateError::Cancelled` as soon as `cancel` fires, dropping any
    /// in-flight provider call or pending backoff sleep.
    pub async fn generate_with_cancel(
        &self,
        history: &[Message],
        profile: Option<&UserProfile>,
        cancel: &CancellationToken,
    ) -> Result<String, GenerateError> {
        let prepared = prepare(history, profile)?;
        let deadline = self.settings.deadline;

        debug!(
            history_len = history.len(),
            turns_sent = prepared.history.len(),
            has_profile = profile.is_some(),
            "Generating tutor reply"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Generation cancelled by caller");
                Err(GenerateError::Cancelled)
            }
            outcome = tokio::time::timeout(deadline, self.run_attempts(prepared)) => {
                match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        let deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
                        error!(deadline_ms, "Generation deadline exceeded");
                        Err(GenerateError::DeadlineExceeded { deadline_ms })
                    }
                }
            }
        }
    }

    /// Bounded retry loop: at most `MAX_RETRIES + 1` provider calls.
    async fn run_attempts(&self, prepared: PreparedConversation) -> Result<String, GenerateError> {
        let mut request = ChatRequest {
            model: String::new(),
            history: prepared.history,
            message: prepared.message,
            system_instruction: prepared.system_instruction,
            config: self.settings.generation,
        };

        let mut attempt: u32 = 0;
        loop {
            let model = select_model(&self.settings.models, attempt);
            request.model = model.to_string();

            let span = info_span!(
                "gen_ai.chat",
                gen_ai.operation.name = "chat",
                gen_ai.system = self.provider.name(),
                gen_ai.request.model = %request.model,
                gen_ai.request.max_tokens = request.config.max_output_tokens,
                gen_ai.request.temperature = ?request.config.temperature,
                attempt,
            );

            let err = match self.provider.chat(&request).instrument(span).await {
                Ok(text) => {
                    if attempt > 0 {
                        info!(attempt, model, "Provider call succeeded after retry");
                    }
                    return Ok(text);
                }
                Err(err) => err,
            };

            match classify(&err, model) {
                Classification::Retryable if attempt < MAX_RETRIES => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        attempt,
                        model,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient provider failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Classification::Retryable => {
                    let attempts = attempt + 1;
                    error!(attempts, model, error = %err, "Provider still busy, giving up");
                    return Err(GenerateError::ProviderBusy {
                        attempts,
                        message: err.to_string(),
                    });
                }
                Classification::Terminal(mapped) => {
                    error!(attempt, model, error = %err, "Provider call failed");
                    return Err(mapped);
                }
            }
        }
    }
}
