use std::sync::Arc;

use super::common::*;
use crate::workflows::audit::adjudication::ConsistencyRuleEngine;
use crate::workflows::audit::domain::{CaseId, Decision, RuleId};
use crate::workflows::audit::orchestrator::{AuditOrchestrator, AuditRunError};
use crate::workflows::audit::repository::StoreError;

const CASE: CaseId = CaseId(42);

#[tokio::test]
async fn consistent_case_runs_to_an_approved_decision() {
    let store = Arc::new(MemoryStore::with_case(CASE, case_file(full_document_set())));
    let engine = ConsistencyRuleEngine::new();

    let report = AuditOrchestrator::new(&*store, &*store, &engine, CASE, as_of())
        .run()
        .await
        .expect("run completes");

    assert_eq!(report.decision, Decision::Approved);
    assert!(report.prerequisites_met);

    let record = store.decision(CASE).expect("decision persisted");
    assert_eq!(record.decision, Decision::Approved);
    assert_eq!(record.explanation, report.explanation);
    assert_eq!(record.decided_at, report.decided_at);
    assert!(store.rejections(CASE).is_empty());
}

#[tokio::test]
async fn mismatched_exam_id_persists_pending_and_rejects_the_document() {
    let store = Arc::new(MemoryStore::with_case(
        CASE,
        case_file(mismatched_exam_document_set()),
    ));
    let engine = ConsistencyRuleEngine::new();

    let report = AuditOrchestrator::new(&*store, &*store, &engine, CASE, as_of())
        .run()
        .await
        .expect("run completes");

    assert_eq!(report.decision, Decision::Pending);

    let rejections = store.rejections(CASE);
    assert_eq!(rejections.len(), 1);
    assert_eq!(rejections[0].document_id, 108);
    assert_eq!(rejections[0].reason.rule, RuleId::NationalIdConsistency);
}

#[tokio::test]
async fn failed_gate_short_circuits_with_every_missing_item() {
    let store = Arc::new(MemoryStore::with_case(
        CASE,
        case_file(vec![residence_proof()]),
    ));
    let engine = ConsistencyRuleEngine::new();

    let report = AuditOrchestrator::new(&*store, &*store, &engine, CASE, as_of())
        .run()
        .await
        .expect("run completes");

    assert_eq!(report.decision, Decision::Pending);
    assert!(!report.prerequisites_met);
    assert!(report.findings.is_empty());
    assert!(report.explanation.contains("identity card"));
    assert!(report.explanation.contains("transcript"));

    let record = store.decision(CASE).expect("failure persisted");
    assert_eq!(record.explanation, report.explanation);
}

#[tokio::test]
async fn zero_documents_fail_the_gate_with_the_dedicated_message() {
    let store = Arc::new(MemoryStore::with_case(CASE, case_file(Vec::new())));
    let engine = ConsistencyRuleEngine::new();

    let report = AuditOrchestrator::new(&*store, &*store, &engine, CASE, as_of())
        .run()
        .await
        .expect("run completes");

    assert_eq!(report.decision, Decision::Pending);
    assert_eq!(report.explanation, "no approved documents");
}

#[tokio::test]
async fn unknown_case_is_a_store_error_not_a_pending_decision() {
    let store = Arc::new(MemoryStore::default());
    let engine = ConsistencyRuleEngine::new();

    let result = AuditOrchestrator::new(&*store, &*store, &engine, CASE, as_of())
        .run()
        .await;

    match result {
        Err(AuditRunError::Store(StoreError::NotFound)) => {}
        other => panic!("expected store error, got {other:?}"),
    }
    assert!(store.decision(CASE).is_none());
}

#[tokio::test]
async fn adjudication_failure_surfaces_without_persisting_anything() {
    let store = Arc::new(MemoryStore::with_case(CASE, case_file(full_document_set())));
    let adjudicator = ScriptedAdjudicator::TransportFailure;

    let result = AuditOrchestrator::new(&*store, &*store, &adjudicator, CASE, as_of())
        .run()
        .await;

    match result {
        Err(AuditRunError::Adjudication(_)) => {}
        other => panic!("expected adjudication error, got {other:?}"),
    }
    // The persister is the sole side effect and it never ran.
    assert!(store.decision(CASE).is_none());
    assert!(store.rejections(CASE).is_empty());
}

#[tokio::test]
async fn persistence_failure_is_reported_as_incomplete() {
    let store = Arc::new(MemoryStore::with_case(CASE, case_file(full_document_set())));
    let sink = UnavailableStore;
    let engine = ConsistencyRuleEngine::new();

    let result = AuditOrchestrator::new(&*store, &sink, &engine, CASE, as_of())
        .run()
        .await;

    match result {
        Err(AuditRunError::Persistence(StoreError::Unavailable(_))) => {}
        other => panic!("expected persistence error, got {other:?}"),
    }
}

#[tokio::test]
async fn scripted_outcome_is_persisted_verbatim() {
    let store = Arc::new(MemoryStore::with_case(CASE, case_file(full_document_set())));
    let adjudicator = ScriptedAdjudicator::Outcome(approved_outcome());

    let report = AuditOrchestrator::new(&*store, &*store, &adjudicator, CASE, as_of())
        .run()
        .await
        .expect("run completes");

    assert_eq!(report.findings, approved_outcome().findings);
    assert_eq!(
        store.decision(CASE).expect("persisted").explanation,
        approved_outcome().explanation
    );
}
