//! Learner profile endpoints.
//!
//! - GET /api/v1/users/{user_id}/profile - Get a profile (empty if never saved)
//! - PUT /api/v1/users/{user_id}/profile - Replace a profile

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use tutoria_core::profile::repository::ProfileRepository;
use tutoria_types::profile::UserProfile;

use crate::http::error::AppError;
use crate::http::handlers::conversation::validate_user_id;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/users/{user_id}/profile - Get a learner profile.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    validate_user_id(&user_id)?;

    let profile = state
        .chat_service
        .profile_repo()
        .get_profile(&user_id)
        .await?
        .unwrap_or_default();

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(profile, request_id, elapsed)
        .with_link("self", &format!("/api/v1/users/{user_id}/profile"));

    Ok(Json(resp))
}

/// PUT /api/v1/users/{user_id}/profile - Create or replace a learner profile.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    validate_user_id(&user_id)?;
    profile.validate()?;

    state
        .chat_service
        .profile_repo()
        .upsert_profile(&user_id, &profile)
        .await?;

    tracing::info!(
        user_id = %user_id,
        interests = profile.interests.len(),
        "Profile updated"
    );

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(profile, request_id, elapsed)
        .with_link("self", &format!("/api/v1/users/{user_id}/profile"));

    Ok(Json(resp))
}
