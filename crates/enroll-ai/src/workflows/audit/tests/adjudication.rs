use super::common::*;
use crate::workflows::audit::adjudication::{AdjudicationError, Adjudicator};
use crate::workflows::audit::domain::{AuditOutcome, Decision, Finding, RuleId};
use crate::workflows::audit::dossier::build_dossier;

#[test]
fn approved_outcome_with_error_finding_breaks_the_contract() {
    let outcome = AuditOutcome {
        findings: vec![Finding::error(
            RuleId::NationalIdConsistency,
            "ids diverge",
        )],
        decision: Decision::Approved,
        explanation: "looks fine".to_string(),
        contested_documents: Vec::new(),
    };

    assert!(!outcome.satisfies_decision_contract());
}

#[test]
fn pending_outcome_without_error_finding_breaks_the_contract() {
    let outcome = AuditOutcome {
        findings: vec![Finding::warning(
            RuleId::IdentityCardExpiry,
            "expiring soon",
        )],
        decision: Decision::Pending,
        explanation: "being careful".to_string(),
        contested_documents: Vec::new(),
    };

    assert!(!outcome.satisfies_decision_contract());
}

#[test]
fn well_formed_outcomes_satisfy_the_contract() {
    assert!(approved_outcome().satisfies_decision_contract());

    let pending = AuditOutcome {
        findings: vec![Finding::error(RuleId::TranscriptCompletion, "unfinished")],
        decision: Decision::Pending,
        explanation: "unfinished".to_string(),
        contested_documents: Vec::new(),
    };
    assert!(pending.satisfies_decision_contract());
}

#[tokio::test]
async fn scripted_transport_failure_is_an_adjudication_error() {
    let dossier = build_dossier(&candidate(), &full_document_set(), as_of());

    match ScriptedAdjudicator::TransportFailure.adjudicate(dossier).await {
        Err(AdjudicationError::Transport(_)) => {}
        other => panic!("expected transport error, got {other:?}"),
    }
}
