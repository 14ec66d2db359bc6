//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tutoria_core::chat::error::ChatError;
use tutoria_types::error::{ProfileError, RepositoryError};
use tutoria_types::llm::GenerateError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Conversation lifecycle and tutoring-turn errors.
    Chat(ChatError),
    /// Profile validation errors.
    Profile(ProfileError),
    /// Storage errors outside the chat service.
    Repository(RepositoryError),
    /// Validation error.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<GenerateError> for AppError {
    fn from(e: GenerateError) -> Self {
        AppError::Chat(ChatError::Generate(e))
    }
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        AppError::Profile(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl AppError {
    /// Status, machine-readable code, and message for this error.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::ConversationNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Conversation {id} not found"),
            ),
            AppError::Chat(ChatError::InvalidMessage(msg))
            | AppError::Chat(ChatError::InvalidTitle(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Chat(ChatError::Generate(e)) => generate_parts(e),
            AppError::Chat(ChatError::Repository(e)) | AppError::Repository(e) => {
                repository_parts(e)
            }
            AppError::Profile(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        }
    }
}

fn generate_parts(e: &GenerateError) -> (StatusCode, &'static str, String) {
    let (status, code) = match e {
        GenerateError::InvalidHistory(_) => (StatusCode::BAD_REQUEST, "INVALID_HISTORY"),
        GenerateError::ConfigurationError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_CONFIG")
        }
        GenerateError::QuotaExceeded(_) => (StatusCode::TOO_MANY_REQUESTS, "QUOTA_EXCEEDED"),
        GenerateError::ContentBlocked(_) => (StatusCode::UNPROCESSABLE_ENTITY, "CONTENT_BLOCKED"),
        GenerateError::ModelUnavailable { .. } => (StatusCode::BAD_GATEWAY, "MODEL_UNAVAILABLE"),
        GenerateError::ProviderBusy { .. } => (StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_BUSY"),
        GenerateError::UnknownProviderError(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
        GenerateError::DeadlineExceeded { .. } => {
            (StatusCode::GATEWAY_TIMEOUT, "DEADLINE_EXCEEDED")
        }
        GenerateError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
    };

    // Configuration detail stays in the server log.
    let message = match e {
        GenerateError::ConfigurationError(detail) => {
            tracing::error!(error = %detail, "Provider configuration error");
            "The tutor is misconfigured. Please contact the administrator.".to_string()
        }
        other => other.to_string(),
    };

    (status, code, message)
}

fn repository_parts(e: &RepositoryError) -> (StatusCode, &'static str, String) {
    match e {
        RepositoryError::NotFound => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", "Entity not found".to_string())
        }
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        other => {
            tracing::error!(error = %other, "Storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Storage failure".to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
