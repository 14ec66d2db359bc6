//! Infrastructure layer for Tutoria.
//!
//! Contains implementations of the ports defined in `tutoria-core`: SQLite
//! storage for conversations, profiles and statistics, the Gemini provider,
//! and the configuration loader.

pub mod config;
pub mod llm;
pub mod sqlite;
