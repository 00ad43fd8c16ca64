use crate::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ServiceStatus {
    pub database: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceStatus,
}

#[derive(Serialize, ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
    pub details: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Person store is unreachable", body = UnhealthyResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.person_service.health_check().await {
        Ok(()) => Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceStatus {
                database: "connected".to_string(),
            },
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnhealthyResponse {
                    status: "unhealthy".to_string(),
                    error: "database ping failed".to_string(),
                    details: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
