//! HTTP error response handling for the API
//!
//! Converts domain errors to HTTP responses with status codes from
//! [`ToHttpStatus`] and the [`ApiError`] JSON envelope.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Handlers that know the status pair it explicitly: (StatusCode, ApiError)
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
