use std::sync::Arc;

use chrono::{Local, NaiveDate};

use super::adjudication::Adjudicator;
use super::domain::{AuditReport, CaseId, DecisionRecord};
use super::orchestrator::{AuditOrchestrator, AuditRunError};
use super::repository::{CaseStore, DecisionSink, StoreError};

/// Service composing the case store, decision sink, and adjudication
/// backend. Each call runs one case to completion; concurrent calls share
/// nothing but the collaborators behind the `Arc`s.
pub struct AuditService<S, D, A> {
    store: Arc<S>,
    sink: Arc<D>,
    adjudicator: Arc<A>,
}

impl<S, D, A> AuditService<S, D, A>
where
    S: CaseStore + 'static,
    D: DecisionSink + 'static,
    A: Adjudicator + 'static,
{
    pub fn new(store: Arc<S>, sink: Arc<D>, adjudicator: Arc<A>) -> Self {
        Self {
            store,
            sink,
            adjudicator,
        }
    }

    /// Run one audit to completion and return the persisted report. `as_of`
    /// defaults to today; it is injectable so date-derived facts stay
    /// reproducible in tests.
    pub async fn audit(
        &self,
        case_id: CaseId,
        as_of: Option<NaiveDate>,
    ) -> Result<AuditReport, AuditRunError> {
        let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
        AuditOrchestrator::new(
            self.store.as_ref(),
            self.sink.as_ref(),
            self.adjudicator.as_ref(),
            case_id,
            as_of,
        )
        .run()
        .await
    }

    /// The last persisted decision for a case, if any.
    pub async fn decision(&self, case_id: CaseId) -> Result<Option<DecisionRecord>, StoreError> {
        self.sink.fetch_decision(case_id).await
    }
}
