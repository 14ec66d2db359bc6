//! HTTP request handlers for the REST API.

pub mod chat;
pub mod conversation;
pub mod profile;
pub mod stats;
