//! JSON payload parsing for WebAdmin routes

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use thiserror::Error;

use crate::errors::{ApiError, ErrorResponder, ErrorType};

/// Parser failure; displays the serde_json diagnostic unchanged.
///
/// The diagnostic is captured as text so the error can be cloned out of a
/// borrowed error chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct JsonExtractError {
    message: String,
    line: usize,
    column: usize,
}

impl From<serde_json::Error> for JsonExtractError {
    fn from(error: serde_json::Error) -> Self {
        Self {
            message: error.to_string(),
            line: error.line(),
            column: error.column(),
        }
    }
}

impl JsonExtractError {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

/// Parses request payloads into `T`.
pub struct JsonExtractor<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonExtractor<T> {
    pub fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }

    pub fn parse(&self, text: &str) -> Result<T, JsonExtractError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn parse_slice(&self, bytes: &[u8]) -> Result<T, JsonExtractError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl<T: DeserializeOwned> Default for JsonExtractor<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Request body parsed with [`JsonExtractor`].
///
/// Unlike `axum::Json`, the content type is not checked and a parse failure
/// is rejected with [`ApiError::JsonExtract`].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            let status = rejection.status();
            ErrorResponder::new(
                status,
                ErrorType::for_status(status),
                "Request body could not be read",
            )
            .details(rejection.body_text())
            .build()
        })?;

        let value = JsonExtractor::new().parse_slice(&bytes)?;
        Ok(JsonBody(value))
    }
}
