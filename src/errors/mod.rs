//! Structured error handling for WebAdmin responses

pub mod codes;
pub mod response;
pub mod translator;

pub use codes::ErrorType;
pub use response::{ErrorResponder, ErrorResponse, Translated};
pub use translator::{
    handle_panic, not_found, translate_errors, ApiError, INTERNAL_ERROR_MESSAGE,
    INVALID_JSON_MESSAGE,
};
