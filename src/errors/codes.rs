use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Error categories exposed in the `type` field of error responses.
///
/// The identifiers are part of the wire contract: renaming one breaks clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ErrorType {
    /// The request carried invalid input
    #[serde(rename = "InvalidArgument")]
    InvalidArgument,

    /// No resource or route matches the request
    #[serde(rename = "NotFound")]
    NotFound,

    /// The targeted resource is not in a state allowing the operation
    #[serde(rename = "WrongState")]
    WrongState,

    /// Unexpected internal failure
    #[serde(rename = "ServerError")]
    ServerError,
}

impl ErrorType {
    /// Wire identifier of this error type
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "InvalidArgument",
            Self::NotFound => "NotFound",
            Self::WrongState => "WrongState",
            Self::ServerError => "ServerError",
        }
    }

    /// HTTP status usually paired with this error type
    pub const fn default_status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::WrongState => StatusCode::CONFLICT,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify an arbitrary error status.
    pub fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => Self::NotFound,
            StatusCode::CONFLICT => Self::WrongState,
            s if s.is_client_error() => Self::InvalidArgument,
            _ => Self::ServerError,
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
