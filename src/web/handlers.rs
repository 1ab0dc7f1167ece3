//! Export and job handlers

use super::state::AppState;
use crate::core::export::JobSnapshot;
use crate::domain::{ExporterError, TransactionId};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

/// Header carrying the correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Deserialize)]
struct ExportRequest {
    #[serde(rename = "conceptTypes")]
    concept_types: Option<Value>,
}

/// Extracts the requested concept types from an optional JSON body
///
/// Anything other than `{"conceptTypes": "<space separated names>"}` means
/// no explicit selection.
fn requested_concept_types(body: &[u8]) -> Vec<String> {
    if body.is_empty() {
        return Vec::new();
    }

    let request: ExportRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "No valid JSON body found, exporting all concept types");
            return Vec::new();
        }
    };

    match request.concept_types {
        Some(Value::String(names)) => names.split_whitespace().map(str::to_string).collect(),
        Some(_) => {
            tracing::info!("The conceptTypes field is not a string, exporting all concept types");
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn transaction_id(headers: &HeaderMap) -> TransactionId {
    TransactionId::from_header(
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok()),
    )
}

/// POST /export - start a full export
pub async fn export(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<JobSnapshot>), ExporterError> {
    let tid = transaction_id(&headers);
    let requested = requested_concept_types(&body);

    let job = state.service.start_export(&requested, &tid).map_err(|e| {
        tracing::warn!(transaction_id = %tid, error = %e, "Export request rejected");
        e
    })?;

    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// GET /job - current job snapshot
pub async fn get_job(State(state): State<AppState>) -> Response {
    match state.service.exporter().current_job() {
        Some(job) => Json(job).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(super::error_response::ErrorBody {
                message: "No export job has been created".to_string(),
            }),
        )
            .into_response(),
    }
}
