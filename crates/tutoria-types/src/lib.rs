//! Shared domain types for Tutoria.
//!
//! This crate contains the core domain types used across the Tutoria backend:
//! conversations, messages, user profiles, provider request shapes, and the
//! error taxonomy surfaced by the response generator.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod profile;
pub mod stats;
