//! Cross-document identity audit for one enrollment case: harmonization of
//! heterogeneous document fields into a canonical dossier, mandatory-document
//! gating, adjudication, and decision persistence.

pub mod adjudication;
pub mod canonical;
pub mod claims;
pub mod derived;
pub mod domain;
pub mod dossier;
pub mod orchestrator;
pub mod prerequisites;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use adjudication::{
    AdjudicationError, Adjudicator, ConsistencyRuleEngine, RemoteAdjudicator,
};
pub use domain::{
    ApprovedDocument, AuditOutcome, AuditReport, Candidate, CaseId, Claim, ClaimKind,
    ContestedDocument, Decision, DecisionRecord, DocumentKind, DocumentRejection, Finding,
    RejectionReason, RuleId, Severity,
};
pub use dossier::{build_dossier, CandidateIdentity, Dossier, ReferenceDates};
pub use orchestrator::{AuditOrchestrator, AuditRunError, AuditState};
pub use prerequisites::PrerequisiteOutcome;
pub use repository::{CaseFile, CaseStore, DecisionSink, StoreError};
pub use router::audit_router;
pub use service::AuditService;
