//! Conversion of request failures into [`ErrorResponse`] bodies.
//!
//! Three entry points cover everything a request can end with:
//! - handlers return [`ApiError`], which renders itself;
//! - [`not_found`] is the router fallback;
//! - [`translate_errors`] wraps the whole router and rewrites any error
//!   response that did not come from an [`ErrorResponse`] (framework
//!   rejections, panics caught by [`handle_panic`], plain-text layers).

use axum::{
    extract::{OriginalUri, Request},
    http::{
        header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::codes::ErrorType;
use super::response::{ErrorResponder, ErrorResponse, Translated};
use crate::json::JsonExtractError;

pub const INVALID_JSON_MESSAGE: &str = "JSON payload of the request is not valid";
pub const INTERNAL_ERROR_MESSAGE: &str = "WebAdmin encountered an unexpected internal error";

/// Upper bound on the body read back from an untranslated error response.
const MAX_UNTRANSLATED_BODY_BYTES: usize = 64 * 1024;

/// Failure returned by WebAdmin handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload is not valid JSON
    #[error("JSON payload of the request is not valid: {0}")]
    JsonExtract(#[from] JsonExtractError),

    /// No route is registered for this method and path
    #[error("{method} {path} can not be found")]
    RouteNotFound { method: Method, path: String },

    /// Domain error already shaped by its handler
    #[error(transparent)]
    Responder(#[from] ErrorResponse),

    /// Anything else
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self::Internal(error.into())
    }
}

/// Classifies by the whole error chain: a JSON extraction failure anywhere in
/// it wins, then a shaped response, anything else is internal.
impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        if let Some(json_error) = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<JsonExtractError>())
        {
            return Self::JsonExtract(json_error.clone());
        }

        if let Some(response) = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<ErrorResponse>())
        {
            return Self::Responder(response.clone());
        }

        Self::Internal(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::JsonExtract(err) => {
                debug!(error = %err, "Rejected invalid JSON payload");
                ErrorResponder::new(
                    StatusCode::BAD_REQUEST,
                    ErrorType::InvalidArgument,
                    INVALID_JSON_MESSAGE,
                )
                .cause(&err)
                .respond()
            }
            Self::RouteNotFound { method, path } => ErrorResponder::new(
                StatusCode::NOT_FOUND,
                ErrorType::NotFound,
                format!("{method} {path} can not be found"),
            )
            .respond(),
            Self::Responder(response) => response.into_response(),
            Self::Internal(err) => {
                error!(error = ?err, "Unexpected internal error while handling request");
                internal_error_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Details are never sent for internal errors; the cause only goes to the logs.
fn internal_error_response(status: StatusCode) -> Response {
    ErrorResponder::new(status, ErrorType::ServerError, INTERNAL_ERROR_MESSAGE).respond()
}

/// Fallback for requests no route matches.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::RouteNotFound {
        method,
        path: uri.path().to_string(),
    }
}

/// Response for a panic caught by `tower_http::catch_panic::CatchPanicLayer`.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::Internal(anyhow::anyhow!("request handler panicked: {reason}")).into_response()
}

/// Outermost guard: every error status leaves the router as an ErrorResponse.
pub async fn translate_errors(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error())
        || response.extensions().get::<Translated>().is_some()
    {
        return response;
    }

    let (parts, body) = response.into_parts();
    let original_body = match axum::body::to_bytes(body, MAX_UNTRANSLATED_BODY_BYTES).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            warn!(error = %err, "Could not read untranslated error body");
            String::new()
        }
    };

    let mut headers = parts.headers;
    let mut translated = match status {
        // Reported as a 404, so the method list no longer applies
        StatusCode::METHOD_NOT_ALLOWED => {
            headers.remove(ALLOW);
            ApiError::RouteNotFound { method, path }.into_response()
        }
        // A registered route answering 404 keeps what it had to say
        StatusCode::NOT_FOUND => ErrorResponder::new(
            StatusCode::NOT_FOUND,
            ErrorType::NotFound,
            format!("{method} {path} can not be found"),
        )
        .details(original_body)
        .respond(),
        s if s.is_server_error() => {
            error!(
                method = %method,
                path = %path,
                status = %s.as_u16(),
                body = %original_body,
                "Untranslated server error"
            );
            internal_error_response(s)
        }
        s => ErrorResponder::new(
            s,
            ErrorType::for_status(s),
            s.canonical_reason().unwrap_or("Invalid request"),
        )
        .details(original_body)
        .respond(),
    };

    carry_headers(&headers, translated.headers_mut());
    translated
}

/// Keeps headers such as `WWW-Authenticate` or `Retry-After` from the original response.
fn carry_headers(from: &HeaderMap, into: &mut HeaderMap) {
    for (name, value) in from {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            into.append(name.clone(), value.clone());
        }
    }
}
