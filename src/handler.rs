//! HTTP request handlers.
//!
//! Handles incoming requests and executes report runs against the shared
//! database pool.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::report::{ReportRequest, ReportResponse, SavedTemplate};
use crate::server::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub pool_active: usize,
    pub pool_idle: usize,
}

/// Structured error envelope for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Reply to a template save.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveTemplateResponse {
    pub saved: bool,
    pub count: usize,
}

fn error_reply(err: ReportError) -> (StatusCode, Json<ErrorResponse>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code().to_string(),
        }),
    )
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let pool = state.db.pool();
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pool_active: size.saturating_sub(idle),
        pool_idle: idle,
    })
}

pub async fn run_report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, (StatusCode, Json<ErrorResponse>)> {
    tracing::info!(
        "Running report: dataset={} page={} page_size={}",
        request.dataset,
        request.page,
        request.page_size
    );

    match state.db.run(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            if err.status_code() < 500 {
                tracing::warn!("Report rejected: {}", err);
            } else {
                tracing::error!("Report failed: {}", err);
            }
            Err(error_reply(err))
        }
    }
}

pub async fn list_templates(State(state): State<Arc<AppState>>) -> Json<Vec<SavedTemplate>> {
    Json(state.templates.list())
}

pub async fn save_template(
    State(state): State<Arc<AppState>>,
    Json(template): Json<SavedTemplate>,
) -> Json<SaveTemplateResponse> {
    tracing::info!(
        "Saving template '{}' (dataset={})",
        template.name,
        template.config.dataset
    );
    let count = state.templates.save(template);
    Json(SaveTemplateResponse { saved: true, count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reply_envelope() {
        let (status, Json(body)) = error_reply(ReportError::invalid_column(
            "incident_safety",
            "cabin_count",
        ));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_COLUMN");
        assert!(body.error.contains("cabin_count"));

        let (status, Json(body)) = error_reply(ReportError::Connection("refused".into()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.code, "CONNECTION_ERROR");
    }
}
