//! Retry policy for provider calls: model fallback, backoff, and error
//! classification.
//!
//! Each model in the fallback list is tried for two consecutive attempts
//! before moving to the next; past the end of the list the last model is
//! reused. Retryable failures back off exponentially (1s, 2s, 4s).

use std::time::Duration;

use tutoria_types::llm::{GenerateError, LlmError, RateLimitScope};

/// Retries allowed after the first attempt (so at most four calls).
pub const MAX_RETRIES: u32 = 3;

/// Attempts spent on each model before falling back to the next.
pub const ATTEMPTS_PER_MODEL: u32 = 2;

/// Delay before the first retry; doubled for each subsequent one.
pub const BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Pick the model for a given attempt: `models[min(attempt / 2, len - 1)]`.
///
/// `models` must be non-empty (enforced by `GeneratorSettings`).
pub fn select_model(models: &[String], attempt: u32) -> &str {
    let index = ((attempt / ATTEMPTS_PER_MODEL) as usize).min(models.len().saturating_sub(1));
    &models[index]
}

/// Delay to wait after a retryable failure on `attempt`: `2^attempt` seconds.
pub fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE * 2u32.saturating_pow(attempt)
}

/// How the generator should react to a provider failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Transient overload or rate limit; worth another attempt.
    Retryable,
    /// Give up and report this error to the caller.
    Terminal(GenerateError),
}

/// Classify a provider failure.
///
/// The provider's structured status (HTTP code and status string) decides
/// first. Message heuristics only run when the structured signal is absent
/// or does not map to anything. Unmatched failures are terminal
/// `UnknownProviderError`s and are never retried.
pub fn classify(error: &LlmError, model: &str) -> Classification {
    match error {
        LlmError::Blocked { reason } => {
            Classification::Terminal(GenerateError::ContentBlocked(reason.clone()))
        }
        LlmError::Api {
            http_status,
            status,
            message,
            rate_limit,
        } => classify_structured(*http_status, status.as_deref(), *rate_limit, message, model)
            .unwrap_or_else(|| classify_text(message, model, error)),
        LlmError::Transport(message) => classify_text(message, model, error),
        LlmError::Deserialization(_) => {
            Classification::Terminal(GenerateError::UnknownProviderError(error.to_string()))
        }
    }
}

fn classify_structured(
    http_status: Option<u16>,
    status: Option<&str>,
    rate_limit: Option<RateLimitScope>,
    message: &str,
    model: &str,
) -> Option<Classification> {
    let status = status.map(str::to_ascii_uppercase);

    match (http_status, status.as_deref()) {
        (_, Some("UNAUTHENTICATED" | "PERMISSION_DENIED")) | (Some(401 | 403), _) => Some(
            Classification::Terminal(GenerateError::ConfigurationError(message.to_string())),
        ),
        (_, Some("NOT_FOUND")) | (Some(404), _) => {
            Some(Classification::Terminal(GenerateError::ModelUnavailable {
                model: model.to_string(),
                message: message.to_string(),
            }))
        }
        (_, Some("RESOURCE_EXHAUSTED")) | (Some(429), _) => {
            let exhausted = match rate_limit {
                Some(RateLimitScope::Exhausted) => true,
                Some(RateLimitScope::Transient) => false,
                None => mentions_hard_quota(message),
            };
            if exhausted {
                Some(Classification::Terminal(GenerateError::QuotaExceeded(
                    message.to_string(),
                )))
            } else {
                Some(Classification::Retryable)
            }
        }
        (_, Some("UNAVAILABLE")) | (Some(503 | 529), _) => Some(Classification::Retryable),
        _ => None,
    }
}

fn classify_text(message: &str, model: &str, error: &LlmError) -> Classification {
    let lower = message.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("api key") || has("api_key") || has("unauthenticated") || has("permission denied") {
        return Classification::Terminal(GenerateError::ConfigurationError(message.to_string()));
    }
    if mentions_quota(&lower) {
        return Classification::Terminal(GenerateError::QuotaExceeded(message.to_string()));
    }
    if has("safety") || has("blocked") {
        return Classification::Terminal(GenerateError::ContentBlocked(message.to_string()));
    }
    if has("model") && (has("not found") || has("does not exist") || has("not supported")) {
        return Classification::Terminal(GenerateError::ModelUnavailable {
            model: model.to_string(),
            message: message.to_string(),
        });
    }
    if has("overloaded")
        || has("rate limit")
        || has("too many requests")
        || has("unavailable")
        || has("503")
        || has("429")
    {
        return Classification::Retryable;
    }

    Classification::Terminal(GenerateError::UnknownProviderError(error.to_string()))
}

fn mentions_quota(message: &str) -> bool {
    message.to_lowercase().contains("quota")
}

/// A 429 with no structured scope is a rate limit unless its text points at
/// a daily or billing quota. Gemini's plain rate-limit message also says
/// "check quota", so the word alone is not enough.
fn mentions_hard_quota(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["per day", "daily", "billing"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn api(http_status: Option<u16>, status: Option<&str>, message: &str) -> LlmError {
        LlmError::Api {
            http_status,
            status: status.map(str::to_string),
            message: message.to_string(),
            rate_limit: None,
        }
    }

    fn rate_limited(message: &str, scope: Option<RateLimitScope>) -> LlmError {
        LlmError::Api {
            http_status: Some(429),
            status: Some("RESOURCE_EXHAUSTED".to_string()),
            message: message.to_string(),
            rate_limit: scope,
        }
    }

    const GEMINI_RATE_LIMIT: &str = "Resource has been exhausted (e.g. check quota).";
    const GEMINI_QUOTA: &str = "You exceeded your current quota, please check your plan and \
billing details. For more information on this error, head to: \
https://ai.google.dev/gemini-api/docs/rate-limits.";

    // -------------------------------------------------------------------
    // Model selection
    // -------------------------------------------------------------------

    #[test]
    fn test_two_models_selected_in_pairs() {
        let list = models(&["A", "B"]);
        let picked: Vec<&str> = (0..4).map(|a| select_model(&list, a)).collect();
        assert_eq!(picked, vec!["A", "A", "B", "B"]);
    }

    #[test]
    fn test_selection_clamps_to_last_model() {
        let list = models(&["A", "B"]);
        assert_eq!(select_model(&list, 4), "B");
        assert_eq!(select_model(&list, 100), "B");
    }

    #[test]
    fn test_single_model_always_selected() {
        let list = models(&["only"]);
        for attempt in 0..=MAX_RETRIES {
            assert_eq!(select_model(&list, attempt), "only");
        }
    }

    #[test]
    fn test_three_models() {
        let list = models(&["A", "B", "C"]);
        let picked: Vec<&str> = (0..6).map(|a| select_model(&list, a)).collect();
        assert_eq!(picked, vec!["A", "A", "B", "B", "C", "C"]);
    }

    // -------------------------------------------------------------------
    // Backoff
    // -------------------------------------------------------------------

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
    }

    // -------------------------------------------------------------------
    // Structured classification
    // -------------------------------------------------------------------

    #[test]
    fn test_503_unavailable_is_retryable() {
        let err = api(Some(503), Some("UNAVAILABLE"), "The model is overloaded. Please try again later.");
        assert_eq!(classify(&err, "A"), Classification::Retryable);
    }

    #[test]
    fn test_429_without_quota_is_retryable() {
        let err = api(Some(429), Some("RESOURCE_EXHAUSTED"), "Resource has been exhausted.");
        assert_eq!(classify(&err, "A"), Classification::Retryable);
    }

    #[test]
    fn test_gemini_check_quota_message_is_retryable() {
        let err = rate_limited(GEMINI_RATE_LIMIT, None);
        assert_eq!(classify(&err, "A"), Classification::Retryable);
    }

    #[test]
    fn test_transient_scope_overrides_quota_wording() {
        let err = rate_limited(GEMINI_QUOTA, Some(RateLimitScope::Transient));
        assert_eq!(classify(&err, "A"), Classification::Retryable);
    }

    #[test]
    fn test_exhausted_scope_is_quota_exceeded() {
        let err = rate_limited(GEMINI_RATE_LIMIT, Some(RateLimitScope::Exhausted));
        assert!(matches!(
            classify(&err, "A"),
            Classification::Terminal(GenerateError::QuotaExceeded(_))
        ));
    }

    #[test]
    fn test_429_quota_is_terminal() {
        let err = api(
            Some(429),
            Some("RESOURCE_EXHAUSTED"),
            "You exceeded your current quota, please check your plan and billing details.",
        );
        assert!(matches!(
            classify(&err, "A"),
            Classification::Terminal(GenerateError::QuotaExceeded(_))
        ));
    }

    #[test]
    fn test_404_is_model_unavailable() {
        let err = api(
            Some(404),
            Some("NOT_FOUND"),
            "models/gemini-9 is not found for API version v1beta",
        );
        match classify(&err, "gemini-9") {
            Classification::Terminal(GenerateError::ModelUnavailable { model, .. }) => {
                assert_eq!(model, "gemini-9");
            }
            other => panic!("Expected ModelUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_403_is_configuration_error() {
        let err = api(Some(403), Some("PERMISSION_DENIED"), "Method doesn't allow unregistered callers.");
        assert!(matches!(
            classify(&err, "A"),
            Classification::Terminal(GenerateError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_status_string_wins_without_http_code() {
        let err = api(None, Some("unavailable"), "try later");
        assert_eq!(classify(&err, "A"), Classification::Retryable);
    }

    #[test]
    fn test_blocked_is_content_blocked() {
        let err = LlmError::Blocked {
            reason: "SAFETY".to_string(),
        };
        assert_eq!(
            classify(&err, "A"),
            Classification::Terminal(GenerateError::ContentBlocked("SAFETY".to_string()))
        );
    }

    // -------------------------------------------------------------------
    // Text heuristics (no usable structured signal)
    // -------------------------------------------------------------------

    #[test]
    fn test_400_invalid_api_key_falls_back_to_text() {
        let err = api(
            Some(400),
            Some("INVALID_ARGUMENT"),
            "API key not valid. Please pass a valid API key.",
        );
        assert!(matches!(
            classify(&err, "A"),
            Classification::Terminal(GenerateError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_transport_text_vocabulary() {
        let cases: &[(&str, &str)] = &[
            ("503 Service Unavailable", "retryable"),
            ("[503 ] The model is overloaded", "retryable"),
            ("429 Too Many Requests", "retryable"),
            ("rate limit reached for requests", "retryable"),
            ("quota exceeded for metric", "quota"),
            ("Response was blocked due to SAFETY", "blocked"),
            ("model gemini-x does not exist", "model"),
            ("API_KEY_INVALID", "config"),
            ("connection reset by peer", "unknown"),
            ("500 Internal Server Error", "unknown"),
        ];

        for (text, expected) in cases {
            let err = LlmError::Transport(text.to_string());
            let got = match classify(&err, "A") {
                Classification::Retryable => "retryable",
                Classification::Terminal(GenerateError::QuotaExceeded(_)) => "quota",
                Classification::Terminal(GenerateError::ContentBlocked(_)) => "blocked",
                Classification::Terminal(GenerateError::ModelUnavailable { .. }) => "model",
                Classification::Terminal(GenerateError::ConfigurationError(_)) => "config",
                Classification::Terminal(GenerateError::UnknownProviderError(_)) => "unknown",
                other => panic!("unexpected classification {other:?}"),
            };
            assert_eq!(got, *expected, "text: {text}");
        }
    }

    #[test]
    fn test_quota_checked_before_429_text() {
        let err = LlmError::Transport("429: quota exhausted".to_string());
        assert!(matches!(
            classify(&err, "A"),
            Classification::Terminal(GenerateError::QuotaExceeded(_))
        ));
    }

    #[test]
    fn test_deserialization_is_unknown_and_not_retried() {
        let err = LlmError::Deserialization("expected value at line 1".to_string());
        assert!(matches!(
            classify(&err, "A"),
            Classification::Terminal(GenerateError::UnknownProviderError(_))
        ));
    }
}
