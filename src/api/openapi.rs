use utoipa::OpenApi;

use crate::errors::{ErrorResponse, ErrorType};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WebAdmin",
        version = "0.1.0",
        description = "Administrative HTTP API. Every failure is reported as a JSON ErrorResponse whose statusCode matches the HTTP status.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::error_routes::internal_error,
        crate::api::error_routes::json_extract_exception,
    ),
    components(
        schemas(
            ErrorResponse,
            ErrorType,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "errors", description = "Diagnostic routes triggering each error translation"),
    )
)]
pub struct ApiDoc;
