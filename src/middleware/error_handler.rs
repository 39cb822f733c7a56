use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    HttpRequest,
};

use crate::core::AppError;

/// Turn malformed JSON bodies into the standard error body
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(path = %req.path(), error = %err, "Rejected JSON payload");
    AppError::invalid_input(format!("Invalid request body: {}", err)).into()
}

/// Turn malformed query strings into the standard error body
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(path = %req.path(), error = %err, "Rejected query string");
    AppError::invalid_input(format!("Invalid query string: {}", err)).into()
}
