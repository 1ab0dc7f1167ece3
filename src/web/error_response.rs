//! HTTP error responses
//!
//! Maps exporter errors to status codes with a JSON `message` body.

use crate::domain::ExporterError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Status code for an exporter error
pub fn status_code(error: &ExporterError) -> StatusCode {
    match error {
        ExporterError::JobAlreadyRunning | ExporterError::Validation(_) => StatusCode::BAD_REQUEST,
        ExporterError::Source(_) | ExporterError::Publish(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
