//! Tutoring turn endpoint.
//!
//! POST /api/v1/conversations/{id}/messages - Send a user message and
//! receive the persisted user/assistant exchange.
//!
//! The reply is returned in one piece. The generation observes a child of
//! the server's shutdown token, so a shutdown fails in-flight turns with
//! `CANCELLED` instead of holding the server open until the deadline.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use tutoria_types::chat::Exchange;

use crate::http::error::AppError;
use crate::http::handlers::conversation::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// POST /api/v1/conversations/{id}/messages - Run one tutoring turn.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<Exchange>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let cancel = state.shutdown.child_token();

    let exchange = state
        .chat_service
        .send_message(&id, &body.content, &cancel)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    tracing::info!(
        conversation_id = %id,
        request_id = %request_id,
        elapsed_ms = elapsed,
        "Tutoring turn completed"
    );

    let resp = ApiResponse::success(exchange, request_id, elapsed)
        .with_link("messages", &format!("/api/v1/conversations/{id}/messages"))
        .with_link("conversation", &format!("/api/v1/conversations/{id}"));

    Ok(Json(resp))
}
