//! Conversation CRUD HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/users/{user_id}/conversations  - Start a conversation
//! - GET    /api/v1/users/{user_id}/conversations  - List a user's conversations
//! - GET    /api/v1/conversations/{id}             - Get a single conversation
//! - PATCH  /api/v1/conversations/{id}             - Rename a conversation
//! - DELETE /api/v1/conversations/{id}             - Delete a conversation
//! - GET    /api/v1/conversations/{id}/messages    - Get stored messages

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use tutoria_types::chat::{ChatMessage, Conversation};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Longest accepted user identifier, in characters.
const MAX_USER_ID_CHARS: usize = 128;

/// Request body for starting a conversation.
#[derive(Debug, Default, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Request body for renaming a conversation.
#[derive(Debug, Deserialize)]
pub struct RenameConversationRequest {
    pub title: String,
}

/// Query parameters for conversation listing.
#[derive(Debug, Deserialize)]
pub struct ConversationListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Query parameters for message listing.
#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    #[serde(default = "default_message_limit")]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

fn default_message_limit() -> Option<i64> {
    Some(100)
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// Check a user identifier taken from the path.
pub(crate) fn validate_user_id(user_id: &str) -> Result<(), AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("user id must not be blank".to_string()));
    }
    if user_id.chars().count() > MAX_USER_ID_CHARS {
        return Err(AppError::Validation(format!(
            "user id must be at most {MAX_USER_ID_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_page(limit: i64, offset: i64) -> Result<(), AppError> {
    if limit < 0 || offset < 0 {
        return Err(AppError::Validation(
            "limit and offset must be non-negative".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/v1/users/{user_id}/conversations - Start a conversation.
pub async fn create_conversation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<CreateConversationRequest>,
) -> Result<Json<ApiResponse<Conversation>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    validate_user_id(&user_id)?;

    let conversation = state
        .chat_service
        .start_conversation(&user_id, body.title)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let id = conversation.id;

    let resp = ApiResponse::success(conversation, request_id, elapsed)
        .with_link("self", &format!("/api/v1/conversations/{id}"))
        .with_link("messages", &format!("/api/v1/conversations/{id}/messages"));

    Ok(Json(resp))
}

/// GET /api/v1/users/{user_id}/conversations - List conversations, most recent first.
pub async fn list_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ConversationListQuery>,
) -> Result<Json<ApiResponse<Vec<Conversation>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    validate_user_id(&user_id)?;
    validate_page(query.limit, query.offset)?;

    let conversations = state
        .chat_service
        .list_conversations(&user_id, Some(query.limit), Some(query.offset))
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(conversations, request_id, elapsed)
        .with_link("self", &format!("/api/v1/users/{user_id}/conversations"))
        .with_link("profile", &format!("/api/v1/users/{user_id}/profile"));

    Ok(Json(resp))
}

/// GET /api/v1/conversations/{id} - Get a conversation by ID.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Conversation>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let conversation = state.chat_service.get_conversation(&id).await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(conversation, request_id, elapsed)
        .with_link("self", &format!("/api/v1/conversations/{id}"))
        .with_link("messages", &format!("/api/v1/conversations/{id}/messages"));

    Ok(Json(resp))
}

/// PATCH /api/v1/conversations/{id} - Rename a conversation.
pub async fn rename_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RenameConversationRequest>,
) -> Result<Json<ApiResponse<Conversation>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let conversation = state
        .chat_service
        .rename_conversation(&id, &body.title)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(conversation, request_id, elapsed)
        .with_link("self", &format!("/api/v1/conversations/{id}"));

    Ok(Json(resp))
}

/// DELETE /api/v1/conversations/{id} - Delete a conversation and its messages.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    state.chat_service.delete_conversation(&id).await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({ "deleted": true, "id": id }),
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}

/// GET /api/v1/conversations/{id}/messages - Get stored messages, oldest first.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    validate_page(query.limit.unwrap_or(0), query.offset.unwrap_or(0))?;

    let messages = state
        .chat_service
        .get_messages(&id, query.limit, query.offset)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(messages, request_id, elapsed)
        .with_link("self", &format!("/api/v1/conversations/{id}/messages"))
        .with_link("conversation", &format!("/api/v1/conversations/{id}"));

    Ok(Json(resp))
}
