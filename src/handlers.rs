//! HTTP request handlers for the phonebook API.
//!
//! Every handler performs at most one storage call. Failures are returned as
//! [`ApiError`], which is the single place errors are logged and turned into
//! responses.

use crate::models::{ErrorResponse, Person, PersonPayload};
use crate::store::{PersonStore, StoreError};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PersonStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }
}

// === Info Page ===

/// GET /info - Record count and server time as an HTML fragment
pub async fn info(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let count = state.store.count().await?;
    let now = Utc::now().format("%a %b %d %Y %H:%M:%S GMT%z");

    Ok(Html(format!(
        "<p>Phonebook has info for {count} people</p>\n<p>{now}</p>"
    )))
}

// === Persons ===

/// GET /api/persons - All persons
pub async fn list_persons(State(state): State<AppState>) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

/// GET /api/persons/:id - One person, or 404 with an empty body
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    state
        .store
        .get(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// DELETE /api/persons/:id - Always 204 for a well-formed id
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let existed = state.store.delete(&id).await?;
    debug!(existed, "Delete processed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/persons - Create a person; both fields are required
pub async fn create_person(
    State(state): State<AppState>,
    PersonBody(payload): PersonBody,
) -> Result<Json<Person>, ApiError> {
    let fields = payload.into_fields().ok_or(ApiError::ContentMissing)?;
    Ok(Json(state.store.create(fields).await?))
}

/// PUT /api/persons/:id - Replace name and number
///
/// Applies the same presence check as creation, so a stored person never
/// loses its name or number.
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PersonBody(payload): PersonBody,
) -> Result<Json<Person>, ApiError> {
    let fields = payload.into_fields().ok_or(ApiError::ContentMissing)?;
    state
        .store
        .update(&id, fields)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Fallback for requests no route matches
pub async fn unknown_endpoint() -> ApiError {
    ApiError::UnknownEndpoint
}

// === Request Bodies ===

/// Person payload read leniently from the request body.
///
/// A missing body, a non-JSON content type, a blank body and a literal `null`
/// all read as an empty payload, so the presence check answers them with
/// "content missing". Only a JSON body that fails to parse is rejected here.
pub struct PersonBody(pub PersonPayload);

#[async_trait]
impl<S> FromRequest<S> for PersonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = is_json(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;

        if !json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(PersonPayload::default()));
        }

        serde_json::from_slice::<Option<PersonPayload>>(&bytes)
            .map(|payload| Self(payload.unwrap_or_default()))
            .map_err(|err| ApiError::MalformedBody(err.to_string()))
    }
}

/// `application/json` or any `+json` media type
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

// === Error Handling ===

/// API error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("content missing")]
    ContentMissing,
    #[error("malformed id: {0}")]
    MalformedId(String),
    #[error("malformed body: {0}")]
    MalformedBody(String),
    #[error("not found")]
    NotFound,
    #[error("unknown endpoint")]
    UnknownEndpoint,
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MalformedId(id) => ApiError::MalformedId(id),
            StoreError::Database(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::ContentMissing => (StatusCode::BAD_REQUEST, Some("content missing")),
            ApiError::MalformedId(_) => (StatusCode::BAD_REQUEST, Some("malformed id")),
            ApiError::MalformedBody(_) => (StatusCode::BAD_REQUEST, Some("malformed body")),
            ApiError::NotFound => (StatusCode::NOT_FOUND, None),
            ApiError::UnknownEndpoint => (StatusCode::NOT_FOUND, Some("unknown endpoint")),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("internal server error"),
            ),
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        match message {
            Some(message) => (
                status,
                Json(ErrorResponse {
                    error: message.to_string(),
                }),
            )
                .into_response(),
            None => status.into_response(),
        }
    }
}
