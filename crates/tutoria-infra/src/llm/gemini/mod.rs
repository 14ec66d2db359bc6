//! Google Gemini LLM provider implementation.
//!
//! This module provides the [`GeminiProvider`] which implements the
//! [`LlmProvider`](tutoria_core::llm::provider::LlmProvider) trait for the
//! Generative Language `generateContent` endpoint.

pub mod client;
pub mod types;

pub use client::GeminiProvider;
