use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Serialize, Serializer};
use std::error::Error as StdError;
use thiserror::Error;
use utoipa::ToSchema;

use super::codes::ErrorType;
use crate::metrics::ERROR_RESPONSES_TOTAL;

/// JSON body returned for every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, Error)]
#[error("{message}")]
pub struct ErrorResponse {
    /// HTTP status code of the response carrying this body
    #[serde(rename = "statusCode", serialize_with = "serialize_status")]
    #[schema(value_type = u16, example = 404)]
    status: StatusCode,
    /// Error category
    #[serde(rename = "type")]
    error_type: ErrorType,
    /// Human-readable summary
    message: String,
    /// Longer diagnostic, omitted when there is none
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

/// Marker inserted in the extensions of every response rendered from an
/// [`ErrorResponse`].
#[derive(Debug, Clone, Copy)]
pub struct Translated;

impl ErrorResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status;

        ERROR_RESPONSES_TOTAL
            .with_label_values(&[self.error_type.as_str(), status.as_str()])
            .inc();

        let mut response = (status, Json(self)).into_response();
        response.extensions_mut().insert(Translated);
        response
    }
}

/// Single-use constructor for [`ErrorResponse`].
///
/// Status, type and message are mandatory; details may be given directly or
/// taken from a cause.
///
/// ```
/// use axum::http::StatusCode;
/// use webadmin::errors::{ErrorResponder, ErrorType};
///
/// let response = ErrorResponder::new(StatusCode::CONFLICT, ErrorType::WrongState, "Task is running")
///     .details("cancel it first")
///     .build();
/// assert_eq!(response.status(), StatusCode::CONFLICT);
/// ```
#[derive(Debug)]
#[must_use]
pub struct ErrorResponder {
    status: StatusCode,
    error_type: ErrorType,
    message: String,
    details: Option<String>,
}

impl ErrorResponder {
    /// # Panics
    ///
    /// Panics if `message` is empty.
    pub fn new(status: StatusCode, error_type: ErrorType, message: impl Into<String>) -> Self {
        let message = message.into();
        assert!(!message.is_empty(), "error responses require a message");

        Self {
            status,
            error_type,
            message,
            details: None,
        }
    }

    /// Message from the cause itself, details from its root cause when that
    /// says something more.
    ///
    /// # Panics
    ///
    /// Panics if the cause renders as an empty string.
    pub fn from_cause(
        status: StatusCode,
        error_type: ErrorType,
        cause: &(dyn StdError + 'static),
    ) -> Self {
        let message = cause.to_string();
        let root = root_cause(cause).to_string();

        let responder = Self::new(status, error_type, message);
        if root != responder.message {
            responder.details(root)
        } else {
            responder
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        self.details = (!details.is_empty()).then_some(details);
        self
    }

    /// Use the cause's text as details unless details were already given.
    pub fn cause(self, cause: &(dyn StdError + 'static)) -> Self {
        if self.details.is_some() {
            self
        } else {
            self.details(cause.to_string())
        }
    }

    pub fn build(self) -> ErrorResponse {
        ErrorResponse {
            status: self.status,
            error_type: self.error_type,
            message: self.message,
            details: self.details,
        }
    }

    /// Build and render as an HTTP response.
    pub fn respond(self) -> Response {
        self.build().into_response()
    }
}

fn root_cause<'a>(error: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current
}
