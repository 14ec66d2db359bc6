//! LlmProvider trait definition.
//!
//! This is the boundary between the response generator and a concrete
//! generative-AI backend. Implementations live in tutoria-infra
//! (e.g., `GeminiProvider`).

use tutoria_types::llm::{ChatRequest, LlmError};

/// Trait for chat-completion provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). One call is
/// one network round-trip; retries and model fallback are the caller's job.
/// Implementations are constructed once at startup and shared read-only.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send one chat request and return the generated text verbatim.
    fn chat(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}

impl<P: LlmProvider> LlmProvider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn chat(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send {
        (**self).chat(request)
    }
}
