//! Adjudication contract and its two backends: the remote service client
//! and the in-process deterministic rule engine. Both honor the same
//! decision contract, so callers can swap them freely.

mod http;
mod rules;

pub use http::RemoteAdjudicator;
pub use rules::ConsistencyRuleEngine;

use std::future::Future;

use super::domain::{AuditOutcome, Decision};
use super::dossier::Dossier;

/// Contract for turning one dossier into findings and a verdict.
pub trait Adjudicator: Send + Sync {
    fn adjudicate(
        &self,
        dossier: Dossier,
    ) -> impl Future<Output = Result<AuditOutcome, AdjudicationError>> + Send;
}

/// Failures of the adjudication step. Every variant is a pipeline failure
/// eligible for retry, never a business `pending`.
#[derive(Debug, thiserror::Error)]
pub enum AdjudicationError {
    #[error("adjudication transport failed: {0}")]
    Transport(String),
    #[error("adjudication endpoint returned status {status}")]
    Status { status: u16 },
    #[error("adjudication response did not match the outcome schema: {0}")]
    Malformed(String),
    #[error("adjudication outcome violates the decision contract: {0}")]
    Contract(String),
}

/// The decision must be derivable from the findings: `approved` iff no
/// error-severity finding. A response breaking this is a service failure,
/// not an outcome.
pub(crate) fn enforce_decision_contract(
    outcome: AuditOutcome,
) -> Result<AuditOutcome, AdjudicationError> {
    if outcome.satisfies_decision_contract() {
        return Ok(outcome);
    }

    let blocking = outcome.blocking_findings();
    let detail = match outcome.decision {
        Decision::Approved => format!("approved with {blocking} error finding(s)"),
        Decision::Pending => "pending without any error finding".to_string(),
    };
    Err(AdjudicationError::Contract(detail))
}
