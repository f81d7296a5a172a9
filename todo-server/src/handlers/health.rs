//! Health check handler
//!
//! The one route that requires no authentication. Used for monitoring and
//! load balancer health checks.

use axum::Json;
use todo_types::HealthResponse;

/// GET /health - static liveness payload
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "todo-service".to_string(),
    })
}
