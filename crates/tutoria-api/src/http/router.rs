//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Conversations (user-scoped)
        .route(
            "/users/{user_id}/conversations",
            get(handlers::conversation::list_conversations)
                .post(handlers::conversation::create_conversation),
        )
        // Conversations (top-level)
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation)
                .patch(handlers::conversation::rename_conversation)
                .delete(handlers::conversation::delete_conversation),
        )
        // Messages and tutoring turns
        .route(
            "/conversations/{id}/messages",
            get(handlers::conversation::get_messages).post(handlers::chat::send_message),
        )
        // Learner profile
        .route(
            "/users/{user_id}/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        // Admin dashboard
        .route("/admin/stats", get(handlers::stats::get_stats));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
