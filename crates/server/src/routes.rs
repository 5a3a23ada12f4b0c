use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::JsonApiError;
use crate::middleware::require_session;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod auth;
pub mod document;
pub mod employee;
pub mod health;

pub use health::health;

/// Files per multipart request the body limit is sized for. Keep the 400
/// descriptions of the multipart routes in sync.
pub const MAX_FILES_PER_REQUEST: usize = 16;
/// Slack for text fields and multipart framing.
pub const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Largest accepted request body for a given per-file limit.
pub fn body_limit(max_file_size: usize) -> usize {
    max_file_size.saturating_mul(MAX_FILES_PER_REQUEST).saturating_add(FORM_OVERHEAD_BYTES)
}

/// Success body: `{success: true, message, data}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

pub fn success<T: Serialize>(message: &str, data: T) -> Json<Envelope<T>> {
    Json(Envelope { success: true, message: message.to_string(), data })
}

pub(crate) fn parse_id(raw: &str, name: &str) -> Result<i32, JsonApiError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| JsonApiError::bad_request(format!("{name} must be a positive integer")))
}

async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "success": false, "message": "Route not found" })))
}

/// Build the full application router: public auth/health/docs routes plus
/// the session-protected employee and document API.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let body_limit = body_limit(state.max_file_size);

    let public = Router::new()
        .route("/health", get(health::health))
        .route("/health/storage", get(health::storage_health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/employee", get(employee::list).post(employee::create))
        .route("/employee/:id", get(employee::get).put(employee::update).delete(employee::delete))
        .route("/document", get(document::list).post(document::upload))
        .route("/document/downloadByEmployeeId", get(document::downloads))
        .route("/document/storedByEmployeeId", get(document::stored_files))
        .route("/document/:id", get(document::get).delete(document::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public)
        .merge(protected)
        .fallback(route_not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
