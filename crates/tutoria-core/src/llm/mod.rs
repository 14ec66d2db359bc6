//! Response generation for Tutoria.
//!
//! - `provider`: the `LlmProvider` trait that concrete backends implement
//! - `context`: history windowing and provider turn conversion
//! - `prompt`: system instruction assembly from the learner profile
//! - `retry`: model fallback, backoff, and failure classification
//! - `generator`: `ResponseGenerator`, the bounded retry loop tying it together

pub mod context;
pub mod generator;
pub mod prompt;
pub mod provider;
pub mod retry;
