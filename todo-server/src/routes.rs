//! Router configuration module
//!
//! Configures all routes, middleware layers, and creates the application router.

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::cors::cors_middleware;
use crate::error::ApiError;
use crate::handlers::{create_todo, delete_todo, health, list_todos, update_todo};
use crate::state::AppState;

/// Create the application router.
///
/// The CORS middleware wraps everything, so errors, the fallback and the
/// preflight short-circuit all carry the origin policy's headers.
pub fn create_router(state: AppState, body_limit_mb: usize) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", axum::routing::put(update_todo).delete(delete_todo))
        .route("/health", get(health))
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(state.clone(), cors_middleware))
        .layer(RequestBodyLimitLayer::new(body_limit_mb * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unknown routes get a JSON 404, still behind the CORS middleware.
async fn fallback() -> ApiError {
    ApiError::not_found("Not Found")
}
