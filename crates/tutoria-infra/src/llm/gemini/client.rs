//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Sends one `generateContent` request per call. Failures are reported with
//! whatever structured signal the API gave (HTTP status, status string, block
//! reason); deciding what is retryable is the generator's job.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the request header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use tutoria_core::llm::provider::LlmProvider;
use tutoria_types::config::ProviderConfig;
use tutoria_types::llm::{ChatRequest, LlmError, RateLimitScope};

use super::types::{
    Content, ErrorDetail, ErrorEnvelope, GeminiGenerationConfig, GenerateContentRequest,
    GenerateContentResponse,
};

/// Finish reasons that mean the candidate was withheld by a safety filter.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Longest raw error body carried into an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Google Gemini provider for the Generative Language REST API.
///
/// Deliberately has no `Debug` impl; it holds the API key.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiProvider {
    const API_VERSION: &'static str = "v1beta";

    /// Create a provider with an explicit base URL and per-call HTTP timeout.
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider from the `[provider]` config section.
    pub fn from_config(config: &ProviderConfig, api_key: SecretString) -> Result<Self, LlmError> {
        Self::new(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Full endpoint URL for a model.
    fn url(&self, model: &str) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url,
            Self::API_VERSION,
            model
        )
    }
}

/// Convert a provider-agnostic [`ChatRequest`] into a Gemini request body.
///
/// Prior turns keep their order and roles; the new user message is appended
/// as the final `user` turn.
pub(crate) fn to_gemini_request(request: &ChatRequest) -> GenerateContentRequest {
    let mut contents: Vec<Content> = request
        .history
        .iter()
        .map(|turn| Content::text(Some(&turn.role.to_string()), &turn.content))
        .collect();
    contents.push(Content::text(Some("user"), &request.message));

    let system_instruction = (!request.system_instruction.is_empty())
        .then(|| Content::text(None, &request.system_instruction));

    GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: GeminiGenerationConfig {
            max_output_tokens: request.config.max_output_tokens,
            temperature: request.config.temperature,
        },
    }
}

/// Map a non-success HTTP response onto [`LlmError::Api`].
///
/// Falls back to the raw (truncated) body when it is not the documented
/// error envelope.
pub(crate) fn parse_error_body(http_status: u16, body: &str) -> LlmError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => LlmError::Api {
            http_status: Some(envelope.error.code.unwrap_or(http_status)),
            rate_limit: rate_limit_scope(&envelope.error.details),
            status: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => {
            let trimmed = body.trim();
            let message = if trimmed.is_empty() {
                reqwest::StatusCode::from_u16(http_status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("empty error body")
                    .to_string()
            } else {
                trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
            };
            LlmError::Api {
                http_status: Some(http_status),
                status: None,
                message,
                rate_limit: None,
            }
        }
    }
}

/// Read which limit a rejection hit from the `google.rpc` details.
///
/// A per-day `QuotaFailure` wins over everything else. A per-minute or
/// per-second violation, or a `RetryInfo` delay, is a short-window limit.
pub(crate) fn rate_limit_scope(details: &[ErrorDetail]) -> Option<RateLimitScope> {
    let quota_ids: Vec<&str> = details
        .iter()
        .filter(|d| d.type_url.ends_with("google.rpc.QuotaFailure"))
        .flat_map(|d| d.violations.iter())
        .filter_map(|v| v.quota_id.as_deref())
        .collect();

    if quota_ids.iter().any(|id| id.contains("PerDay")) {
        return Some(RateLimitScope::Exhausted);
    }

    let short_window = quota_ids
        .iter()
        .any(|id| id.contains("PerMinute") || id.contains("PerSecond"));
    let retry_hint = details
        .iter()
        .any(|d| d.type_url.ends_with("google.rpc.RetryInfo") && d.retry_delay.is_some());

    (short_window || retry_hint).then_some(RateLimitScope::Transient)
}

/// Pull the reply text out of a successful response.
///
/// Prompt-level blocks and safety finish reasons become
/// [`LlmError::Blocked`]. Thought parts are skipped; the remaining text
/// parts are concatenated unmodified.
pub(crate) fn extract_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(LlmError::Blocked { reason });
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(LlmError::Deserialization(
            "response contained no candidates".to_string(),
        ));
    };

    if let Some(reason) = candidate
        .finish_reason
        .as_deref()
        .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
    {
        return Err(LlmError::Blocked {
            reason: reason.to_string(),
        });
    }

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    let mut text_parts = parts
        .into_iter()
        .filter(|p| p.thought != Some(true))
        .filter_map(|p| p.text)
        .peekable();

    if text_parts.peek().is_none() {
        return Err(LlmError::Deserialization(format!(
            "candidate had no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("none")
        )));
    }

    Ok(text_parts.collect())
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = to_gemini_request(request);
        let url = self.url(&request.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(parse_error_body(status.as_u16(), &error_body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutoria_types::llm::{GenerationConfig, ProviderTurn, TurnRole};

    fn make_provider() -> GeminiProvider {
        GeminiProvider::new(
            SecretString::from("test-key-not-real"),
            "https://generativelanguage.googleapis.com/",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn sample_request() -> ChatRequest {
        ChatRequest {
            model: "gemini-2.0-flash".to_string(),
            history: vec![
                ProviderTurn {
                    role: TurnRole::User,
                    content: "What is a stack?".to_string(),
                },
                ProviderTurn {
                    role: TurnRole::Model,
                    content: "A LIFO collection.".to_string(),
                },
            ],
            message: "And a queue?".to_string(),
            system_instruction: "You are a tutor.".to_string(),
            config: GenerationConfig {
                max_output_tokens: 1024,
                temperature: 0.5,
            },
        }
    }

    fn parse_response(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(make_provider().name(), "gemini");
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let provider = make_provider();
        assert_eq!(
            provider.url("gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_from_config() {
        let provider = GeminiProvider::from_config(
            &ProviderConfig {
                base_url: "http://localhost:9999".to_string(),
                ..ProviderConfig::default()
            },
            SecretString::from("k"),
        )
        .unwrap();
        assert!(provider.url("m").starts_with("http://localhost:9999/v1beta/"));
    }

    #[test]
    fn test_request_wire_format() {
        let body = serde_json::to_value(to_gemini_request(&sample_request())).unwrap();

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "What is a stack?");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "And a queue?");

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a tutor.");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert!(contents[0]["parts"][0].get("thought").is_none());
    }

    #[test]
    fn test_empty_system_instruction_omitted() {
        let mut request = sample_request();
        request.system_instruction.clear();
        let body = serde_json::to_value(to_gemini_request(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_structured_error() {
        let body = r#"{
            "error": {
                "code": 503,
                "message": "The model is overloaded. Please try again later.",
                "status": "UNAVAILABLE"
            }
        }"#;
        match parse_error_body(503, body) {
            LlmError::Api {
                http_status,
                status,
                message,
                rate_limit,
            } => {
                assert_eq!(http_status, Some(503));
                assert_eq!(rate_limit, None);
                assert_eq!(status.as_deref(), Some("UNAVAILABLE"));
                assert!(message.contains("overloaded"));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unstructured_error() {
        match parse_error_body(502, "<html>Bad Gateway</html>") {
            LlmError::Api {
                http_status,
                status,
                message,
                ..
            } => {
                assert_eq!(http_status, Some(502));
                assert_eq!(status, None);
                assert_eq!(message, "<html>Bad Gateway</html>");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_error_uses_reason_phrase() {
        match parse_error_body(429, "") {
            LlmError::Api { message, .. } => assert_eq!(message, "Too Many Requests"),
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    const PER_MINUTE_429: &str = r#"{"error":{"code":429,"message":"You exceeded your current quota, please check your plan and billing details. For more information on this error, head to: https://ai.google.dev/gemini-api/docs/rate-limits.","status":"RESOURCE_EXHAUSTED","details":[{"@type":"type.googleapis.com/google.rpc.QuotaFailure","violations":[{"quotaMetric":"generativelanguage.googleapis.com/generate_content_free_tier_requests","quotaId":"GenerateRequestsPerMinutePerProjectPerModel-FreeTier","quotaDimensions":{"location":"global","model":"gemini-2.0-flash"},"quotaValue":"15"}]},{"@type":"type.googleapis.com/google.rpc.Help","links":[{"description":"Learn more about Gemini API quotas","url":"https://ai.google.dev/gemini-api/docs/rate-limits"}]},{"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"43s"}]}}"#;

    const PER_DAY_429: &str = r#"{"error":{"code":429,"message":"You exceeded your current quota, please check your plan and billing details. For more information on this error, head to: https://ai.google.dev/gemini-api/docs/rate-limits.","status":"RESOURCE_EXHAUSTED","details":[{"@type":"type.googleapis.com/google.rpc.QuotaFailure","violations":[{"quotaMetric":"generativelanguage.googleapis.com/generate_content_free_tier_requests","quotaId":"GenerateRequestsPerDayPerProjectPerModel-FreeTier","quotaDimensions":{"location":"global","model":"gemini-2.0-flash"},"quotaValue":"200"}]},{"@type":"type.googleapis.com/google.rpc.Help","links":[{"description":"Learn more about Gemini API quotas","url":"https://ai.google.dev/gemini-api/docs/rate-limits"}]},{"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"12s"}]}}"#;

    const GENERIC_429: &str = r#"{"error":{"code":429,"message":"Resource has been exhausted (e.g. check quota).","status":"RESOURCE_EXHAUSTED"}}"#;

    fn rate_limit_of(body: &str) -> Option<RateLimitScope> {
        match parse_error_body(429, body) {
            LlmError::Api { rate_limit, .. } => rate_limit,
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_per_minute_quota_is_transient() {
        assert_eq!(rate_limit_of(PER_MINUTE_429), Some(RateLimitScope::Transient));
    }

    #[test]
    fn test_per_day_quota_is_exhausted_despite_retry_info() {
        assert_eq!(rate_limit_of(PER_DAY_429), Some(RateLimitScope::Exhausted));
    }

    #[test]
    fn test_retry_info_alone_is_transient() {
        let body = r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED","details":[{"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"5s"}]}}"#;
        assert_eq!(rate_limit_of(body), Some(RateLimitScope::Transient));
    }

    #[test]
    fn test_error_without_details_has_no_scope() {
        assert_eq!(rate_limit_of(GENERIC_429), None);
    }

    #[test]
    fn test_rate_limit_bodies_classify_end_to_end() {
        use tutoria_core::llm::retry::{Classification, classify};
        use tutoria_types::llm::GenerateError;

        let model = "gemini-2.0-flash";
        assert_eq!(
            classify(&parse_error_body(429, PER_MINUTE_429), model),
            Classification::Retryable
        );
        assert_eq!(
            classify(&parse_error_body(429, GENERIC_429), model),
            Classification::Retryable
        );
        assert!(matches!(
            classify(&parse_error_body(429, PER_DAY_429), model),
            Classification::Terminal(GenerateError::QuotaExceeded(_))
        ));
    }

    #[test]
    fn test_extract_text_verbatim() {
        let response = parse_response(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"  A queue is "},{"text":"FIFO.\n"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "  A queue is FIFO.\n");
    }

    #[test]
    fn test_extract_text_skips_thoughts() {
        let response = parse_response(
            r#"{"candidates":[{"content":{"parts":[{"text":"thinking...","thought":true},{"text":"Answer"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "Answer");
    }

    #[test]
    fn test_prompt_block_reason() {
        let response = parse_response(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        match extract_text(response) {
            Err(LlmError::Blocked { reason }) => assert_eq!(reason, "SAFETY"),
            other => panic!("Expected Blocked, got {other:?}"),
        }
    }

    #[test]
    fn test_safety_finish_reason() {
        let response = parse_response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(extract_text(response), Err(LlmError::Blocked { .. })));
    }

    #[test]
    fn test_no_candidates_is_deserialization_error() {
        let response = parse_response("{}");
        assert!(matches!(
            extract_text(response),
            Err(LlmError::Deserialization(_))
        ));
    }

    #[test]
    fn test_max_tokens_without_text() {
        let response = parse_response(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"MAX_TOKENS"}]}"#);
        match extract_text(response) {
            Err(LlmError::Deserialization(msg)) => assert!(msg.contains("MAX_TOKENS")),
            other => panic!("Expected Deserialization, got {other:?}"),
        }
    }
}
