use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use utoipa::ToSchema;

use super::middleware::RequestId;
use crate::errors::{
    self, ErrorCode, ErrorInput, ErrorResponder, ErrorResponseBuilder, ExceptionMapping,
    ExceptionTable, FieldErrors,
};
use crate::raised_error;

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub responder: ErrorResponder,
}

raised_error!(
    /// Lookup of an unknown user
    pub UserNotFoundException
);
raised_error!(
    /// Access by a banned user
    pub UserBannedException
);
raised_error!(
    /// Request body failed validation
    pub InvalidInputException => "validation_failed"
);

/// Exception mappings for the demo failures; configured entries override these
pub fn default_exceptions() -> ExceptionTable {
    ExceptionTable::new()
        .with("UserNotFoundException", ExceptionMapping::with_status(404))
        .with("UserBannedException", ExceptionMapping::with_status(403))
        .with("InvalidInputException", ExceptionMapping::with_status(422))
}

/// Messages for the demo failures; configured entries override these
pub fn default_messages() -> Vec<(ErrorCode, String)> {
    vec![
        (
            ErrorCode::from("user_banned"),
            "Your account is banned".to_string(),
        ),
        (
            ErrorCode::from("validation_failed"),
            "The given data was invalid".to_string(),
        ),
    ]
}

/// Optional message for an explicit error
#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ErrorParams {
    /// Message to report instead of the registered one
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Send the assembled error, or a bare 500 if assembly itself failed
fn respond(result: Result<errors::AssembledError, errors::Error>) -> Response {
    match result {
        Ok(assembled) => assembled.into_response(),
        Err(e) => {
            error!("Failed to assemble error response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "message": errors::FALLBACK_MESSAGE })),
            )
                .into_response()
        }
    }
}

/// Builder for this request, tagged with its request ID when one was assigned
fn request_builder(
    state: &AppState,
    request_id: Option<Extension<RequestId>>,
) -> ErrorResponseBuilder {
    let builder = state.responder.builder();
    match request_id {
        Some(Extension(RequestId(id))) => builder.with_request_id(id),
        None => builder,
    }
}

fn raise(builder: &mut ErrorResponseBuilder, error: &dyn errors::Raised) -> Response {
    respond(builder.raised(error).and_then(ErrorResponseBuilder::finish))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "error-responder",
        "version": env!("CARGO_PKG_VERSION"),
        "build": {
            "version": env!("CARGO_PKG_VERSION"),
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
        },
        "errors": {
            "registered_messages": state.responder.registry().len(),
            "exception_mappings": state.responder.exceptions().len(),
            "default_status": state.responder.default_status(),
        },
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Respond with an explicit error code
#[utoipa::path(
    get,
    path = "/errors/{code}",
    tag = "errors",
    params(
        ("code" = String, Path, description = "Error code; numeric codes are sent as integers"),
        ErrorParams
    ),
    responses(
        (status = 500, description = "Error envelope for the code", body = errors::ErrorEnvelope)
    )
)]
pub async fn get_error(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Path(code): Path<String>,
    Query(params): Query<ErrorParams>,
) -> Response {
    let code = ErrorCode::from_key(&code);
    info!("Explicit error request: code={}", code);

    let input = match params.message.as_deref() {
        Some(message) => ErrorInput::code_with_message(&code, message),
        None => ErrorInput::code(&code),
    };

    let mut builder = request_builder(&state, request_id);
    respond(builder.error(input).and_then(ErrorResponseBuilder::finish))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = u64, Path, description = "User ID; 0 is unknown, IDs ending in 13 are banned")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 403, description = "User is banned", body = errors::ErrorEnvelope),
        (status = 404, description = "User not found", body = errors::ErrorEnvelope)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Path(id): Path<u64>,
) -> Response {
    let mut builder = request_builder(&state, request_id);

    if id == 0 {
        return raise(
            &mut builder,
            &UserNotFoundException::new(format!("No user with id {}", id)),
        );
    }
    if id % 100 == 13 {
        return raise(
            &mut builder,
            &UserBannedException::new(format!("User {} is banned", id)),
        );
    }

    Json(User {
        id,
        name: format!("user-{}", id),
        email: format!("user-{}@example.com", id),
    })
    .into_response()
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 422, description = "Validation failed", body = errors::ErrorEnvelope)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Json(payload): Json<CreateUser>,
) -> Response {
    let mut failures = FieldErrors::new();
    let name = payload.name.unwrap_or_default();
    let email = payload.email.unwrap_or_default();

    if name.trim().is_empty() {
        failures.add("name", "is required");
    }
    if email.trim().is_empty() {
        failures.add("email", "is required");
    } else if !email.contains('@') {
        failures.add("email", "must be a valid email address");
    }

    if !failures.is_empty() {
        info!("Rejected user creation: {} invalid field(s)", failures.len());
        let mut builder = request_builder(&state, request_id);
        let error = InvalidInputException::new("Invalid user data");
        return respond(
            builder
                .raised(&error)
                .and_then(|b| b.validator(&failures))
                .and_then(ErrorResponseBuilder::finish),
        );
    }

    (
        StatusCode::CREATED,
        Json(User {
            id: 1,
            name,
            email,
        }),
    )
        .into_response()
}
