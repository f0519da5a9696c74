//! Fixed triggers for each error translation path.
//!
//! `GET /errors/notFound` is deliberately left unregistered so the router
//! fallback answers it.

use axum::{routing::get, Json, Router};
use serde_json::Value;

use crate::errors::{not_found, ApiError, ErrorResponse};
use crate::json::JsonExtractor;

pub const BASE_URL: &str = "/errors";
pub const INTERNAL_SERVER_ERROR: &str = "internalError";
pub const NOT_FOUND: &str = "notFound";
pub const JSON_EXTRACT_EXCEPTION: &str = "jsonExtractException";

/// Payload that no JSON parser accepts.
const INVALID_JSON: &str = "a";

pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            &format!("{BASE_URL}/{INTERNAL_SERVER_ERROR}"),
            get(internal_error).fallback(not_found),
        )
        .route(
            &format!("{BASE_URL}/{JSON_EXTRACT_EXCEPTION}"),
            get(json_extract_exception).fallback(not_found),
        )
}

/// Always fails with an unexpected internal error
#[utoipa::path(
    get,
    path = "/errors/internalError",
    tag = "errors",
    responses(
        (status = 500, description = "Internal error translation", body = ErrorResponse)
    )
)]
pub async fn internal_error() -> Result<(), ApiError> {
    Err(anyhow::anyhow!("internal error requested through the diagnostic route").into())
}

/// Always fails to parse its JSON payload
#[utoipa::path(
    get,
    path = "/errors/jsonExtractException",
    tag = "errors",
    responses(
        (status = 400, description = "Invalid JSON translation", body = ErrorResponse)
    )
)]
pub async fn json_extract_exception() -> Result<Json<Value>, ApiError> {
    let value = JsonExtractor::<Value>::new().parse(INVALID_JSON)?;
    Ok(Json(value))
}
