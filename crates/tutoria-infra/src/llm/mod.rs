//! LLM provider implementations.
//!
//! Contains concrete implementations of the
//! [`LlmProvider`](tutoria_core::llm::provider::LlmProvider) trait defined in
//! `tutoria-core`. Tutoria talks to Google's Generative Language API.

pub mod gemini;
