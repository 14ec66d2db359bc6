//! Conversation persistence and the chat service.
//!
//! `ChatRepository` is the storage port; `ChatService` loads recent history,
//! asks the response generator for a reply, and persists the exchange.

pub mod error;
pub mod repository;
pub mod service;
pub mod title;
