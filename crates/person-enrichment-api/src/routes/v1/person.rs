use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::SecondsFormat;
use person_enrichment::person::{Person, PersonChanges, PersonError, PersonFilter, PersonId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// API representation of a person
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonDto {
    pub id: i64,
    pub name: String,
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Person> for PersonDto {
    fn from(person: Person) -> Self {
        Self {
            id: person.id.value(),
            name: person.name,
            surname: person.surname,
            age: person.age,
            gender: person.gender,
            nationality: person.nationality,
            created_at: person
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            updated_at: person
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Request to create a new person
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePersonRequest {
    pub name: String,
    pub surname: String,
}

/// Request to update a person. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePersonRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub age: Option<u32>,
    /// An empty string clears the stored value
    pub gender: Option<String>,
    /// An empty string clears the stored value
    pub nationality: Option<String>,
}

impl From<UpdatePersonRequest> for PersonChanges {
    fn from(request: UpdatePersonRequest) -> Self {
        PersonChanges {
            name: request.name,
            surname: request.surname,
            age: request.age,
            gender: request.gender.map(Some),
            nationality: request.nationality.map(Some),
        }
    }
}

/// Listing query. Unparseable numbers fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPersonsQuery {
    /// Case-insensitive substring
    pub name: Option<String>,
    /// Case-insensitive substring
    pub surname: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    /// ISO country code
    pub nationality: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    /// Records per page (1-100)
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

impl From<ListPersonsQuery> for PersonFilter {
    fn from(query: ListPersonsQuery) -> Self {
        let defaults = PersonFilter::default();
        PersonFilter {
            name: query.name,
            surname: query.surname,
            age: query.age.and_then(|a| a.trim().parse().ok()),
            gender: query.gender,
            nationality: query.nationality,
            page: query
                .page
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.page),
            page_size: query
                .page_size
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.page_size),
        }
    }
}

/// Response for listing persons
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListPersonsResponse {
    pub data: Vec<PersonDto>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn from_person_error(e: PersonError) -> ApiError {
    match e {
        PersonError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "Person not found"),
        PersonError::InvalidData(message) => api_error(StatusCode::BAD_REQUEST, message),
        other => {
            tracing::error!("Person store failure: {}", other);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn parse_id(id: &str) -> Result<PersonId, ApiError> {
    id.parse()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid ID"))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))
}

/// List persons with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/persons",
    params(ListPersonsQuery),
    responses(
        (status = 200, description = "One page of persons", body = ListPersonsResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "persons"
)]
pub async fn list_persons(
    State(state): State<AppState>,
    Query(query): Query<ListPersonsQuery>,
) -> Result<Json<ListPersonsResponse>, ApiError> {
    let page = state
        .person_service
        .list_persons(PersonFilter::from(query))
        .await
        .map_err(from_person_error)?;

    Ok(Json(ListPersonsResponse {
        data: page.items.into_iter().map(PersonDto::from).collect(),
        total: page.total,
        page: page.page,
        size: page.page_size,
    }))
}

/// Create a new person, enriched from the first name
#[utoipa::path(
    post,
    path = "/api/v1/persons",
    request_body = CreatePersonRequest,
    responses(
        (status = 201, description = "Person created", body = PersonDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "persons"
)]
pub async fn create_person(
    State(state): State<AppState>,
    payload: Result<Json<CreatePersonRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body(payload)?;

    let person = state
        .person_service
        .create_person(&request.name, &request.surname)
        .await
        .map_err(from_person_error)?;

    Ok((StatusCode::CREATED, Json(PersonDto::from(person))))
}

/// Get a specific person by ID
#[utoipa::path(
    get,
    path = "/api/v1/persons/{id}",
    params(
        ("id" = i64, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Person details", body = PersonDto),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Person not found", body = ErrorResponse)
    ),
    tag = "persons"
)]
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PersonDto>, ApiError> {
    let id = parse_id(&id)?;

    let person = state
        .person_service
        .get_person(id)
        .await
        .map_err(from_person_error)?;

    Ok(Json(PersonDto::from(person)))
}

/// Update the supplied fields of a person
#[utoipa::path(
    put,
    path = "/api/v1/persons/{id}",
    params(
        ("id" = i64, Path, description = "Person ID")
    ),
    request_body = UpdatePersonRequest,
    responses(
        (status = 200, description = "Person updated", body = PersonDto),
        (status = 400, description = "Invalid ID or body", body = ErrorResponse),
        (status = 404, description = "Person not found", body = ErrorResponse)
    ),
    tag = "persons"
)]
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePersonRequest>, JsonRejection>,
) -> Result<Json<PersonDto>, ApiError> {
    let id = parse_id(&id)?;
    let request = body(payload)?;

    let person = state
        .person_service
        .update_person(id, PersonChanges::from(request))
        .await
        .map_err(from_person_error)?;

    Ok(Json(PersonDto::from(person)))
}

/// Delete a person
#[utoipa::path(
    delete,
    path = "/api/v1/persons/{id}",
    params(
        ("id" = i64, Path, description = "Person ID")
    ),
    responses(
        (status = 204, description = "Person deleted"),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Person not found", body = ErrorResponse)
    ),
    tag = "persons"
)]
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    state
        .person_service
        .delete_person(id)
        .await
        .map_err(from_person_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Routes for person endpoints
pub fn routes() -> axum::Router<AppState> {
    use axum::routing::get;

    axum::Router::new()
        .route("/", get(list_persons).post(create_person))
        .route(
            "/{id}",
            get(get_person).put(update_person).delete(delete_person),
        )
}
