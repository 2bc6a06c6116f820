use std::future::Future;

use serde::{Deserialize, Serialize};

use super::domain::{ApprovedDocument, Candidate, CaseId, DecisionRecord, DocumentRejection};

/// Everything the external store returns for one case: the candidate and
/// every document whose approval status is "approved". Re-fetched per run;
/// never cached across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFile {
    pub candidate: Candidate,
    pub documents: Vec<ApprovedDocument>,
}

/// Read contract against the external store.
pub trait CaseStore: Send + Sync {
    /// Fetch the candidate and approved document set for one case. A case
    /// with zero approved documents is a valid result; an unknown case is
    /// [`StoreError::NotFound`].
    fn fetch_case(
        &self,
        case_id: CaseId,
    ) -> impl Future<Output = Result<CaseFile, StoreError>> + Send;
}

/// Write contract for audit decisions. The sink is the pipeline's only
/// externally visible side effect and is always the last step of a run.
pub trait DecisionSink: Send + Sync {
    /// Persist the decision for a case; last write wins.
    fn record_decision(
        &self,
        case_id: CaseId,
        record: DecisionRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Mark specific documents rejected with a machine-readable reason.
    fn reject_documents(
        &self,
        case_id: CaseId,
        rejections: Vec<DocumentRejection>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The most recently persisted decision for a case, if any.
    fn fetch_decision(
        &self,
        case_id: CaseId,
    ) -> impl Future<Output = Result<Option<DecisionRecord>, StoreError>> + Send;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("case not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
