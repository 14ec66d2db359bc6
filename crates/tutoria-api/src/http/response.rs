//! Standard JSON response envelope for all API endpoints.
//!
//! Every response follows the shape:
//! ```json
//! {
//!   "data": ...,
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 42 },
//!   "errors": [],
//!   "_links": { "self": "/api/v1/conversations/..." }
//! }
//! ```

use std::collections::HashMap;

use serde::Serialize;

/// Standard API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
    pub errors: Vec<ApiError>,
    #[serde(rename = "_links", skip_serializing_if = "HashMap::is_empty")]
    pub links: HashMap<String, String>,
}

/// Response metadata included in every response.
#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: String,
    pub response_time_ms: u64,
}

/// A single error entry in the response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response with data.
    pub fn success(data: T, request_id: String, elapsed_ms: u64) -> Self {
        Self {
            data: Some(data),
            meta: ResponseMeta {
                request_id,
                timestamp: chrono::Utc::now().to_rfc3339(),
                response_time_ms: elapsed_ms,
            },
            errors: vec![],
            links: HashMap::new(),
        }
    }

    /// Add a HATEOAS link.
    pub fn with_link(mut self, rel: &str, href: &str) -> Self {
        self.links.insert(rel.to_string(), href.to_string());
        self
    }
}
