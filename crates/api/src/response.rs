//! Response envelope helpers.
//!
//! Every endpoint answers `{"success": true, "data": ...}` or
//! `{"success": false, "error": CODE, "message": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// Wraps data in the success envelope with status 200.
pub fn ok<T: Serialize>(data: T) -> Response {
    with_status(StatusCode::OK, data)
}

/// Wraps data in the success envelope with status 201.
pub fn created<T: Serialize>(data: T) -> Response {
    with_status(StatusCode::CREATED, data)
}

/// Wraps data in the success envelope with an explicit status.
pub fn with_status<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({"success": true, "data": data}))).into_response()
}

/// Builds the failure envelope from a numeric status, code, and message.
pub fn error(status: u16, code: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({"success": false, "error": code, "message": message})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_falls_back_to_500_on_bad_status() {
        let response = error(9999, "X", "y");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_ok_status() {
        let response = ok(serde_json::json!({"k": 1}));
        assert_eq!(response.status(), StatusCode::OK);
    }
}
