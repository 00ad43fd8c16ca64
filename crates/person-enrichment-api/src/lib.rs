use axum::Router;
use axum::http::HeaderValue;
use person_enrichment::{Enricher, PersonRepository, PersonService};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod routes;

pub use config::{ApiConfig, CorsConfig};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub person_service: PersonService,
}

impl AppState {
    /// One store handle for the lifetime of the process
    pub fn new(repository: Arc<dyn PersonRepository>, enricher: Arc<dyn Enricher>) -> Self {
        Self {
            person_service: PersonService::new(repository, enricher),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Person Enrichment API",
        description = "Persons enriched with predicted age, gender and nationality"
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::v1::person::create_person,
        crate::routes::v1::person::list_persons,
        crate::routes::v1::person::get_person,
        crate::routes::v1::person::update_person,
        crate::routes::v1::person::delete_person,
    ),
    components(
        schemas(
            crate::routes::health::HealthResponse,
            crate::routes::health::ServiceStatus,
            crate::routes::health::UnhealthyResponse,
            crate::routes::v1::person::PersonDto,
            crate::routes::v1::person::CreatePersonRequest,
            crate::routes::v1::person::UpdatePersonRequest,
            crate::routes::v1::person::ListPersonsResponse,
            crate::routes::v1::person::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "persons", description = "Person records")
    )
)]
pub struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allow_any_origin {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build API application
pub fn build_app(state: AppState, config: &ApiConfig) -> Router {
    let mut router = Router::new().merge(routes::routes());

    if config.enable_swagger {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
