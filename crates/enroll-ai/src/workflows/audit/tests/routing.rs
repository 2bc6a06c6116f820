use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::audit::adjudication::ConsistencyRuleEngine;
use crate::workflows::audit::domain::CaseId;
use crate::workflows::audit::router::audit_router;
use crate::workflows::audit::service::AuditService;

const CASE: CaseId = CaseId(42);

fn seeded_router() -> axum::Router {
    let (service, _store) = rule_engine_service(CASE, full_document_set());
    audit_router(Arc::new(service))
}

fn post_run(case_id: u64, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(format!("/api/v1/audits/{case_id}/run"))
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn run_route_returns_the_report() {
    let response = seeded_router()
        .oneshot(post_run(42, json!({ "as_of": "2025-11-10" })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["decision"], json!("approved"));
    assert_eq!(payload["prerequisites_met"], json!(true));
    assert!(payload["findings"].as_array().is_some());
}

#[tokio::test]
async fn run_route_returns_not_found_for_unknown_cases() {
    let response = seeded_router()
        .oneshot(post_run(999, json!({})))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn run_route_maps_adjudication_failure_to_bad_gateway() {
    let store = Arc::new(MemoryStore::with_case(CASE, case_file(full_document_set())));
    let service = AuditService::new(
        store.clone(),
        store,
        Arc::new(ScriptedAdjudicator::TransportFailure),
    );
    let router = audit_router(Arc::new(service));

    let response = router
        .oneshot(post_run(42, json!({})))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn decision_route_reflects_persisted_state() {
    let (service, _store) = rule_engine_service(CASE, full_document_set());
    let service = Arc::new(service);
    let router = audit_router(service.clone());

    let response = router
        .clone()
        .oneshot(
            axum::http::Request::get("/api/v1/audits/42")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    service
        .audit(CASE, Some(as_of()))
        .await
        .expect("audit completes");

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/audits/42")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["decision"], json!("approved"));
}

#[tokio::test]
async fn run_route_works_without_a_body() {
    let (service, _store) = rule_engine_service(CASE, full_document_set());
    let router = audit_router(Arc::new(service));

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/audits/42/run")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
}
