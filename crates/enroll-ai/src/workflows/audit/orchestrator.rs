//! The audit pipeline as an explicit state machine. Every transition is a
//! total function of the current state's output; the machine never revisits
//! a state, and persistence is always the final step, so a run cancelled
//! earlier leaves no partial write behind.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use super::adjudication::{Adjudicator, AdjudicationError};
use super::domain::{
    ApprovedDocument, AuditOutcome, AuditReport, CaseId, ContestedDocument, Decision,
    DecisionRecord, DocumentRejection,
};
use super::dossier::{build_dossier, Dossier};
use super::prerequisites;
use super::repository::{CaseFile, CaseStore, DecisionSink, StoreError};

/// Pipeline failures, kept distinct from a business `pending` outcome so the
/// invoking layer can retry instead of recording a substantive denial.
#[derive(Debug, thiserror::Error)]
pub enum AuditRunError {
    #[error("case fetch failed: {0}")]
    Store(#[source] StoreError),
    #[error(transparent)]
    Adjudication(#[from] AdjudicationError),
    #[error("decision persistence failed: {0}")]
    Persistence(#[source] StoreError),
}

/// States of one audit run.
pub enum AuditState {
    Fetch,
    CheckPrerequisites {
        case: CaseFile,
    },
    Harmonize {
        case: CaseFile,
    },
    Adjudicate {
        case: CaseFile,
        dossier: Dossier,
    },
    PersistDecision {
        case: CaseFile,
        outcome: AuditOutcome,
    },
    PersistPrerequisiteFailure {
        message: String,
    },
    Done {
        report: AuditReport,
    },
}

impl AuditState {
    const fn label(&self) -> &'static str {
        match self {
            AuditState::Fetch => "fetch",
            AuditState::CheckPrerequisites { .. } => "check_prerequisites",
            AuditState::Harmonize { .. } => "harmonize",
            AuditState::Adjudicate { .. } => "adjudicate",
            AuditState::PersistDecision { .. } => "persist_decision",
            AuditState::PersistPrerequisiteFailure { .. } => "persist_prerequisite_failure",
            AuditState::Done { .. } => "done",
        }
    }
}

/// Drives one case through fetch, gating, harmonization, adjudication, and
/// persistence. Owns no state beyond the single run.
pub struct AuditOrchestrator<'a, S, D, A> {
    store: &'a S,
    sink: &'a D,
    adjudicator: &'a A,
    case_id: CaseId,
    as_of: NaiveDate,
}

impl<'a, S, D, A> AuditOrchestrator<'a, S, D, A>
where
    S: CaseStore,
    D: DecisionSink,
    A: Adjudicator,
{
    pub fn new(
        store: &'a S,
        sink: &'a D,
        adjudicator: &'a A,
        case_id: CaseId,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            store,
            sink,
            adjudicator,
            case_id,
            as_of,
        }
    }

    pub async fn run(self) -> Result<AuditReport, AuditRunError> {
        let mut state = AuditState::Fetch;

        loop {
            debug!(case_id = self.case_id.0, state = state.label(), "audit step");

            state = match state {
                AuditState::Fetch => {
                    let case = self
                        .store
                        .fetch_case(self.case_id)
                        .await
                        .map_err(AuditRunError::Store)?;
                    AuditState::CheckPrerequisites { case }
                }
                AuditState::CheckPrerequisites { case } => {
                    let gate = prerequisites::check(&case.documents);
                    if gate.met {
                        AuditState::Harmonize { case }
                    } else {
                        AuditState::PersistPrerequisiteFailure {
                            message: gate.message,
                        }
                    }
                }
                AuditState::Harmonize { case } => {
                    let dossier = build_dossier(&case.candidate, &case.documents, self.as_of);
                    AuditState::Adjudicate { case, dossier }
                }
                AuditState::Adjudicate { case, dossier } => {
                    let outcome = self.adjudicator.adjudicate(dossier).await?;
                    AuditState::PersistDecision { case, outcome }
                }
                AuditState::PersistDecision { case, outcome } => {
                    let decided_at = Utc::now();
                    self.sink
                        .record_decision(
                            self.case_id,
                            DecisionRecord {
                                decision: outcome.decision,
                                explanation: outcome.explanation.clone(),
                                decided_at,
                            },
                        )
                        .await
                        .map_err(AuditRunError::Persistence)?;

                    if outcome.decision == Decision::Pending
                        && !outcome.contested_documents.is_empty()
                    {
                        let rejections =
                            resolve_rejections(&case.documents, &outcome.contested_documents);
                        if !rejections.is_empty() {
                            self.sink
                                .reject_documents(self.case_id, rejections)
                                .await
                                .map_err(AuditRunError::Persistence)?;
                        }
                    }

                    AuditState::Done {
                        report: AuditReport {
                            case_id: self.case_id,
                            decision: outcome.decision,
                            explanation: outcome.explanation,
                            findings: outcome.findings,
                            prerequisites_met: true,
                            decided_at,
                        },
                    }
                }
                AuditState::PersistPrerequisiteFailure { message } => {
                    let decided_at = Utc::now();
                    self.sink
                        .record_decision(
                            self.case_id,
                            DecisionRecord {
                                decision: Decision::Pending,
                                explanation: message.clone(),
                                decided_at,
                            },
                        )
                        .await
                        .map_err(AuditRunError::Persistence)?;

                    AuditState::Done {
                        report: AuditReport {
                            case_id: self.case_id,
                            decision: Decision::Pending,
                            explanation: message,
                            findings: Vec::new(),
                            prerequisites_met: false,
                            decided_at,
                        },
                    }
                }
                AuditState::Done { report } => {
                    info!(
                        case_id = report.case_id.0,
                        decision = report.decision.label(),
                        "audit run complete"
                    );
                    return Ok(report);
                }
            };
        }
    }
}

/// The adjudicator names contested document *types*; map them back to the
/// concrete documents fetched for this run.
fn resolve_rejections(
    documents: &[ApprovedDocument],
    contested: &[ContestedDocument],
) -> Vec<DocumentRejection> {
    contested
        .iter()
        .flat_map(|contested| {
            documents
                .iter()
                .filter(move |document| document.kind == contested.document_type)
                .map(move |document| DocumentRejection {
                    document_id: document.id,
                    reason: contested.reason.clone(),
                })
        })
        .collect()
}
