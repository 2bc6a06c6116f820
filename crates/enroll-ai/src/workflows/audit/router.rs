use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::adjudication::Adjudicator;
use super::domain::CaseId;
use super::orchestrator::AuditRunError;
use super::repository::{CaseStore, DecisionSink, StoreError};
use super::service::AuditService;

/// Router builder exposing HTTP endpoints for running audits and reading
/// persisted decisions.
pub fn audit_router<S, D, A>(service: Arc<AuditService<S, D, A>>) -> Router
where
    S: CaseStore + 'static,
    D: DecisionSink + 'static,
    A: Adjudicator + 'static,
{
    Router::new()
        .route("/api/v1/audits/:case_id/run", post(run_handler::<S, D, A>))
        .route("/api/v1/audits/:case_id", get(decision_handler::<S, D, A>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RunAuditRequest {
    /// Reference date for date-derived facts; defaults to today.
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) async fn run_handler<S, D, A>(
    State(service): State<Arc<AuditService<S, D, A>>>,
    Path(case_id): Path<u64>,
    request: Option<axum::Json<RunAuditRequest>>,
) -> Response
where
    S: CaseStore + 'static,
    D: DecisionSink + 'static,
    A: Adjudicator + 'static,
{
    let as_of = request.and_then(|axum::Json(request)| request.as_of);

    match service.audit(CaseId(case_id), as_of).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(AuditRunError::Store(StoreError::NotFound)) => {
            let payload = json!({ "error": "case not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error @ AuditRunError::Store(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        // Adjudication failures are retryable pipeline faults, never a
        // business `pending`; bad gateway keeps them distinguishable.
        Err(error @ AuditRunError::Adjudication(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(error @ AuditRunError::Persistence(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn decision_handler<S, D, A>(
    State(service): State<Arc<AuditService<S, D, A>>>,
    Path(case_id): Path<u64>,
) -> Response
where
    S: CaseStore + 'static,
    D: DecisionSink + 'static,
    A: Adjudicator + 'static,
{
    match service.decision(CaseId(case_id)).await {
        Ok(Some(record)) => (StatusCode::OK, axum::Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "no decision recorded for case" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}
