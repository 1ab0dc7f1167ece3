//! Health, good-to-go and build-info endpoints

use super::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Result of one dependency check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub name: String,
    pub ok: bool,
    pub check_output: String,
}

/// Body of `GET /__health`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub schema_version: u8,
    pub system_code: String,
    pub name: String,
    pub description: String,
    pub ok: bool,
    pub checks: Vec<CheckResult>,
}

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
}

async fn run_checks(state: &AppState) -> Vec<CheckResult> {
    let mut results = Vec::with_capacity(state.service.health_checks().len());
    for check in state.service.health_checks() {
        let result = match check.check_health().await {
            Ok(output) => CheckResult {
                name: check.name().to_string(),
                ok: true,
                check_output: output,
            },
            Err(e) => {
                tracing::warn!(check = check.name(), error = %e, "Health check failed");
                CheckResult {
                    name: check.name().to_string(),
                    ok: false,
                    check_output: e.to_string(),
                }
            }
        };
        results.push(result);
    }
    results
}

/// GET /__health
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let checks = run_checks(&state).await;
    Json(HealthReport {
        schema_version: 1,
        system_code: state.application.system_code.clone(),
        name: state.application.name.clone(),
        description: "Exports concepts from Neo4j to CSV files in S3".to_string(),
        ok: checks.iter().all(|c| c.ok),
        checks,
    })
}

/// GET /__gtg
pub async fn good_to_go(State(state): State<AppState>) -> impl IntoResponse {
    let checks = run_checks(&state).await;
    match checks.iter().find(|c| !c.ok) {
        None => (StatusCode::OK, "OK".to_string()),
        Some(failed) => (StatusCode::SERVICE_UNAVAILABLE, failed.check_output.clone()),
    }
}

/// GET /__build-info
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
