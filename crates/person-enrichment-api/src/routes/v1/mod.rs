use crate::AppState;
use axum::Router;

pub mod person;

/// API v1 routes
pub fn routes() -> Router<AppState> {
    Router::new().nest("/persons", person::routes())
}
