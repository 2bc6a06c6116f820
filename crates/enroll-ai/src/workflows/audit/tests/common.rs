use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::workflows::audit::adjudication::{
    AdjudicationError, Adjudicator, ConsistencyRuleEngine,
};
use crate::workflows::audit::domain::{
    ApprovedDocument, AuditOutcome, Candidate, CaseId, Decision, DecisionRecord, DocumentKind,
    DocumentRejection, Finding, RuleId,
};
use crate::workflows::audit::dossier::Dossier;
use crate::workflows::audit::repository::{CaseFile, CaseStore, DecisionSink, StoreError};
use crate::workflows::audit::service::AuditService;

/// Fixed reference date so derived facts stay reproducible.
pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 10).expect("valid reference date")
}

pub(super) fn candidate() -> Candidate {
    Candidate {
        id: 10,
        registered_name: "BRUNO GOMES DA SILVA".to_string(),
        registered_national_id: "12345678900".to_string(),
    }
}

pub(super) fn identity_card() -> ApprovedDocument {
    ApprovedDocument::new(
        101,
        DocumentKind::IdentityCard,
        json!({
            "name": "BRUNO GOMES DA SILVA",
            "national_id": "123.456.789-00",
            "date_of_birth": "20/04/2003",
            "id_number": "11.222.333-4",
            "issuance_date": "15/01/2022",
            "birthplace": "RIO DE JANEIRO - RJ",
            "filiation": {
                "mother": "MARIA APARECIDA GOMES",
                "father": "JOÃO CARLOS DA SILVA"
            }
        }),
    )
}

pub(super) fn transcript() -> ApprovedDocument {
    ApprovedDocument::new(
        103,
        DocumentKind::Transcript,
        json!({
            "student_name": "BRUNO GOMES DA SILVA",
            "education_level": "Ensino Médio",
            "institution": "ESCOLA ESTADUAL PADRE ANCHIETA",
            "academic_years": "2020 - 2022",
            "city": "RIO DE JANEIRO",
            "state": "RJ",
            "completion_confirmed": true
        }),
    )
}

pub(super) fn residence_proof() -> ApprovedDocument {
    ApprovedDocument::new(
        104,
        DocumentKind::ResidenceProof,
        json!({
            "titleholder_name": "MARIA APARECIDA GOMES",
            "street": "RUA DAS FLORES",
            "number": "100",
            "district": "CENTRO",
            "city": "RIO DE JANEIRO",
            "state": "RJ",
            "postal_code": "20000100",
            "issuance_date": "25/10/2025",
            "issuing_company": "COMPANHIA DE LUZ",
            "linked_national_id": null,
            "bill_type": "conta de luz"
        }),
    )
}

pub(super) fn military_certificate() -> ApprovedDocument {
    ApprovedDocument::new(
        106,
        DocumentKind::MilitaryCertificate,
        json!({
            "name": "BRUNO GOMES DA SILVA",
            "national_id": "123.456.789-00",
            "filiation": {
                "mother": "MARIA APARECIDA GOMES",
                "father": "JOÃO CARLOS DA SILVA"
            }
        }),
    )
}

pub(super) fn birth_certificate() -> ApprovedDocument {
    ApprovedDocument::new(
        107,
        DocumentKind::BirthCertificate,
        json!({
            "registrant_name": "BRUNO GOMES DA SILVA",
            "date_of_birth": "20/04/2003",
            "birthplace": "RIO DE JANEIRO - RJ",
            "filiation": {
                "mother": "MARIA APARECIDA GOMES",
                "father": "JOÃO CARLOS DA SILVA"
            }
        }),
    )
}

pub(super) fn exam_report() -> ApprovedDocument {
    ApprovedDocument::new(
        108,
        DocumentKind::ExamReport,
        json!({
            "participant_name": "BRUNO GOMES DA SILVA",
            "national_id": "12345678900",
            "exam_year": 2022
        }),
    )
}

/// The fully consistent scenario: every document agrees with the
/// registration and the residence proof is titled to the mother.
pub(super) fn full_document_set() -> Vec<ApprovedDocument> {
    vec![
        identity_card(),
        transcript(),
        residence_proof(),
        military_certificate(),
        birth_certificate(),
        exam_report(),
    ]
}

/// Same candidate, but the exam report carries a different national id.
pub(super) fn mismatched_exam_document_set() -> Vec<ApprovedDocument> {
    let mut documents = full_document_set();
    for document in &mut documents {
        if document.kind == DocumentKind::ExamReport {
            document.fields["national_id"] = json!("98765432100");
        }
    }
    documents
}

pub(super) fn case_file(documents: Vec<ApprovedDocument>) -> CaseFile {
    CaseFile {
        candidate: candidate(),
        documents,
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    cases: Mutex<HashMap<CaseId, CaseFile>>,
    decisions: Mutex<HashMap<CaseId, DecisionRecord>>,
    rejections: Mutex<HashMap<CaseId, Vec<DocumentRejection>>>,
}

impl MemoryStore {
    pub(super) fn with_case(case_id: CaseId, case: CaseFile) -> Self {
        let store = Self::default();
        store
            .cases
            .lock()
            .expect("case mutex poisoned")
            .insert(case_id, case);
        store
    }

    pub(super) fn decision(&self, case_id: CaseId) -> Option<DecisionRecord> {
        self.decisions
            .lock()
            .expect("decision mutex poisoned")
            .get(&case_id)
            .cloned()
    }

    pub(super) fn rejections(&self, case_id: CaseId) -> Vec<DocumentRejection> {
        self.rejections
            .lock()
            .expect("rejection mutex poisoned")
            .get(&case_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl CaseStore for MemoryStore {
    async fn fetch_case(&self, case_id: CaseId) -> Result<CaseFile, StoreError> {
        self.cases
            .lock()
            .expect("case mutex poisoned")
            .get(&case_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

impl DecisionSink for MemoryStore {
    async fn record_decision(
        &self,
        case_id: CaseId,
        record: DecisionRecord,
    ) -> Result<(), StoreError> {
        self.decisions
            .lock()
            .expect("decision mutex poisoned")
            .insert(case_id, record);
        Ok(())
    }

    async fn reject_documents(
        &self,
        case_id: CaseId,
        rejections: Vec<DocumentRejection>,
    ) -> Result<(), StoreError> {
        self.rejections
            .lock()
            .expect("rejection mutex poisoned")
            .insert(case_id, rejections);
        Ok(())
    }

    async fn fetch_decision(&self, case_id: CaseId) -> Result<Option<DecisionRecord>, StoreError> {
        Ok(self.decision(case_id))
    }
}

/// Store that refuses every call, for unavailable-backend paths.
pub(super) struct UnavailableStore;

impl CaseStore for UnavailableStore {
    async fn fetch_case(&self, _case_id: CaseId) -> Result<CaseFile, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

impl DecisionSink for UnavailableStore {
    async fn record_decision(
        &self,
        _case_id: CaseId,
        _record: DecisionRecord,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn reject_documents(
        &self,
        _case_id: CaseId,
        _rejections: Vec<DocumentRejection>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn fetch_decision(
        &self,
        _case_id: CaseId,
    ) -> Result<Option<DecisionRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Adjudicator stub: either returns a canned outcome or fails like a dead
/// upstream.
pub(super) enum ScriptedAdjudicator {
    Outcome(AuditOutcome),
    TransportFailure,
}

impl Adjudicator for ScriptedAdjudicator {
    async fn adjudicate(&self, _dossier: Dossier) -> Result<AuditOutcome, AdjudicationError> {
        match self {
            ScriptedAdjudicator::Outcome(outcome) => Ok(outcome.clone()),
            ScriptedAdjudicator::TransportFailure => Err(AdjudicationError::Transport(
                "connection refused".to_string(),
            )),
        }
    }
}

pub(super) fn approved_outcome() -> AuditOutcome {
    AuditOutcome {
        findings: vec![Finding::ok(
            RuleId::NameConsistency,
            "registered name matches every document name",
        )],
        decision: Decision::Approved,
        explanation: "documents are mutually consistent and pre-approved".to_string(),
        contested_documents: Vec::new(),
    }
}

pub(super) fn rule_engine_service(
    case_id: CaseId,
    documents: Vec<ApprovedDocument>,
) -> (
    AuditService<MemoryStore, MemoryStore, ConsistencyRuleEngine>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::with_case(case_id, case_file(documents)));
    let service = AuditService::new(
        store.clone(),
        store.clone(),
        Arc::new(ConsistencyRuleEngine::new()),
    );
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
