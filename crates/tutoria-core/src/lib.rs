//! Business logic and repository trait definitions for Tutoria.
//!
//! This crate defines the "ports" (repository and provider traits) that the
//! infrastructure layer implements, plus the response generator and chat
//! service built on top of them. It depends only on `tutoria-types` -- never
//! on `tutoria-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod profile;
pub mod stats;
