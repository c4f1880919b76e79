use utoipa::OpenApi;

use crate::api::handlers::{CreateUser, ErrorParams, User};
use crate::errors::{ErrorBody, ErrorEnvelope};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Error Responder",
        version = "0.1.0",
        description = "Turns application error codes and raised errors into structured error responses. The demo routes exercise explicit codes, configured raised errors and attached validation failures.",
        contact(
            name = "Error Responder API",
        )
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::get_error,
        crate::api::handlers::get_user,
        crate::api::handlers::create_user,
    ),
    components(
        schemas(
            ErrorEnvelope,
            ErrorBody,
            ErrorParams,
            User,
            CreateUser,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "errors", description = "Explicit error code responses"),
        (name = "users", description = "Demo resource raising errors and validation failures"),
    )
)]
pub struct ApiDoc;
