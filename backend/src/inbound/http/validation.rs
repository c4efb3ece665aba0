//! Request validation helpers for the HTTP adapter.
//!
//! Domain validation failures and extractor rejections all leave as
//! `invalid_request` errors whose details name the offending field and a
//! stable code.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use pagination::PageError;
use serde_json::json;
use tracing::debug;

use crate::domain::{CalculationValidationError, Error, UserValidationError};

/// Detail codes for rejections raised by the adapter itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RejectionCode {
    InvalidJson,
    InvalidQuery,
    InvalidPath,
    NegativeValue,
}

impl RejectionCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::InvalidQuery => "invalid_query",
            Self::InvalidPath => "invalid_path",
            Self::NegativeValue => "negative_value",
        }
    }
}

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn user_validation_error(err: &UserValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn calculation_validation_error(err: &CalculationValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn page_error(err: &PageError) -> Error {
    field_error(
        err.field(),
        RejectionCode::NegativeValue.as_str(),
        err.to_string(),
    )
}

fn rejection(code: RejectionCode, message: String) -> actix_web::Error {
    debug!(code = code.as_str(), %message, "request rejected by extractor");
    Error::invalid_request(message)
        .with_details(json!({ "code": code.as_str() }))
        .into()
}

fn json_rejection(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    rejection(RejectionCode::InvalidJson, format!("invalid JSON body: {err}"))
}

fn query_rejection(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    rejection(
        RejectionCode::InvalidQuery,
        format!("invalid query string: {err}"),
    )
}

fn path_rejection(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    rejection(
        RejectionCode::InvalidPath,
        format!("invalid path parameter: {err}"),
    )
}

/// JSON extractor settings routing failures into the shared error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_rejection)
}

/// Query extractor settings routing failures into the shared error shape.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_rejection)
}

/// Path extractor settings routing failures into the shared error shape.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_rejection)
}
