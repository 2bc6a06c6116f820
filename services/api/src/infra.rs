use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Months, NaiveDate};
use enroll_ai::config::AdjudicatorConfig;
use enroll_ai::workflows::audit::{
    AdjudicationError, Adjudicator, ApprovedDocument, AuditOutcome, AuditService, Candidate,
    CaseFile, CaseId, CaseStore, ConsistencyRuleEngine, DecisionRecord, DecisionSink,
    DocumentKind, DocumentRejection, Dossier, RemoteAdjudicator, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ApiAuditService =
    AuditService<InMemoryCaseStore, InMemoryCaseStore, AdjudicatorBackend>;

/// In-memory stand-in for the enrollment store, implementing both the read
/// and write contracts. Writes are last-write-wins, matching the sink's
/// idempotency requirement.
#[derive(Default)]
pub(crate) struct InMemoryCaseStore {
    cases: Mutex<HashMap<CaseId, CaseFile>>,
    decisions: Mutex<HashMap<CaseId, DecisionRecord>>,
    rejections: Mutex<HashMap<CaseId, Vec<DocumentRejection>>>,
}

impl InMemoryCaseStore {
    pub(crate) fn insert_case(&self, case_id: CaseId, case: CaseFile) {
        self.cases
            .lock()
            .expect("case mutex poisoned")
            .insert(case_id, case);
    }

    pub(crate) fn case_ids(&self) -> Vec<CaseId> {
        let mut ids: Vec<CaseId> = self
            .cases
            .lock()
            .expect("case mutex poisoned")
            .keys()
            .copied()
            .collect();
        ids.sort();
        ids
    }

    pub(crate) fn decisions(&self) -> Vec<(CaseId, DecisionRecord)> {
        let mut decisions: Vec<(CaseId, DecisionRecord)> = self
            .decisions
            .lock()
            .expect("decision mutex poisoned")
            .iter()
            .map(|(case_id, record)| (*case_id, record.clone()))
            .collect();
        decisions.sort_by_key(|(case_id, _)| *case_id);
        decisions
    }

    pub(crate) fn rejections(&self, case_id: CaseId) -> Vec<DocumentRejection> {
        self.rejections
            .lock()
            .expect("rejection mutex poisoned")
            .get(&case_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl CaseStore for InMemoryCaseStore {
    async fn fetch_case(&self, case_id: CaseId) -> Result<CaseFile, StoreError> {
        self.cases
            .lock()
            .expect("case mutex poisoned")
            .get(&case_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

impl DecisionSink for InMemoryCaseStore {
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
        Ok(self
            .decisions
            .lock()
            .expect("decision mutex poisoned")
            .get(&case_id)
            .cloned())
    }
}

/// Adjudication backend selected at startup: the remote service when an
/// endpoint is configured, the in-process rule engine otherwise.
pub(crate) enum AdjudicatorBackend {
    Remote(RemoteAdjudicator),
    Rules(ConsistencyRuleEngine),
}

impl AdjudicatorBackend {
    pub(crate) fn from_config(config: &AdjudicatorConfig) -> Result<Self, AdjudicationError> {
        match &config.endpoint {
            Some(endpoint) => Ok(Self::Remote(RemoteAdjudicator::new(
                endpoint.clone(),
                config.rule_spec.clone(),
                Duration::from_secs(config.timeout_secs),
            )?)),
            None => Ok(Self::Rules(ConsistencyRuleEngine::new())),
        }
    }

    pub(crate) const fn label(&self) -> &'static str {
        match self {
            AdjudicatorBackend::Remote(_) => "remote",
            AdjudicatorBackend::Rules(_) => "rules",
        }
    }
}

impl Adjudicator for AdjudicatorBackend {
    async fn adjudicate(&self, dossier: Dossier) -> Result<AuditOutcome, AdjudicationError> {
        match self {
            AdjudicatorBackend::Remote(remote) => remote.adjudicate(dossier).await,
            AdjudicatorBackend::Rules(rules) => rules.adjudicate(dossier).await,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn day_month_year(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

/// Seed the three demo cases. Dates are generated relative to `today` so the
/// fixtures never go stale.
pub(crate) fn seeded_store(today: NaiveDate) -> InMemoryCaseStore {
    let store = InMemoryCaseStore::default();
    store.insert_case(CaseId(1), consistent_case(today));
    store.insert_case(CaseId(2), mismatched_exam_case(today));
    store.insert_case(CaseId(3), missing_issuance_case());
    store
}

/// Case 1: every document agrees with the registration and the residence
/// proof is titled to the mother.
fn consistent_case(today: NaiveDate) -> CaseFile {
    let identity_issued = day_month_year(months_before(today, 24));
    let residence_issued = day_month_year(months_before(today, 1));

    CaseFile {
        candidate: Candidate {
            id: 10,
            registered_name: "BRUNO GOMES DA SILVA".to_string(),
            registered_national_id: "12345678900".to_string(),
        },
        documents: vec![
            ApprovedDocument::new(
                101,
                DocumentKind::IdentityCard,
                json!({
                    "name": "BRUNO GOMES DA SILVA",
                    "national_id": "123.456.789-00",
                    "date_of_birth": "20/04/2003",
                    "id_number": "11.222.333-4",
                    "issuance_date": identity_issued,
                    "birthplace": "RIO DE JANEIRO - RJ",
                    "filiation": {
                        "mother": "MARIA APARECIDA GOMES",
                        "father": "JOÃO CARLOS DA SILVA"
                    }
                }),
            ),
            ApprovedDocument::new(
                103,
                DocumentKind::Transcript,
                json!({
                    "student_name": "BRUNO GOMES DA SILVA",
                    "institution": "ESCOLA ESTADUAL PADRE ANCHIETA",
                    "education_level": "Ensino Médio",
                    "academic_years": "2020 - 2022",
                    "completion_confirmed": true
                }),
            ),
            ApprovedDocument::new(
                104,
                DocumentKind::ResidenceProof,
                json!({
                    "titleholder_name": "MARIA APARECIDA GOMES",
                    "street": "RUA DAS FLORES",
                    "number": "100",
                    "city": "RIO DE JANEIRO",
                    "state": "RJ",
                    "postal_code": "20000100",
                    "issuance_date": residence_issued,
                    "issuing_company": "COMPANHIA DE LUZ",
                    "bill_type": "conta de luz"
                }),
            ),
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
            ),
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
            ),
            ApprovedDocument::new(
                108,
                DocumentKind::ExamReport,
                json!({
                    "participant_name": "BRUNO GOMES DA SILVA",
                    "national_id": "12345678900",
                    "exam_year": 2022
                }),
            ),
        ],
    }
}

/// Case 2: the exam report's national id digits diverge from the identity
/// card's, which must block the case.
fn mismatched_exam_case(today: NaiveDate) -> CaseFile {
    let identity_issued = day_month_year(months_before(today, 36));

    CaseFile {
        candidate: Candidate {
            id: 11,
            registered_name: "CAMILA FERREIRA DUARTE".to_string(),
            registered_national_id: "55566677788".to_string(),
        },
        documents: vec![
            ApprovedDocument::new(
                201,
                DocumentKind::IdentityCard,
                json!({
                    "name": "CAMILA FERREIRA DUARTE",
                    "national_id": "555.666.777-88",
                    "date_of_birth": "02/09/2004",
                    "id_number": "22.333.444-5",
                    "issuance_date": identity_issued,
                    "filiation": {
                        "mother": "HELENA FERREIRA DUARTE",
                        "father": "MARCOS DUARTE"
                    }
                }),
            ),
            ApprovedDocument::new(
                203,
                DocumentKind::Transcript,
                json!({
                    "student_name": "CAMILA FERREIRA DUARTE",
                    "institution": "COLÉGIO ESTADUAL SANTOS DUMONT",
                    "completion_confirmed": true
                }),
            ),
            ApprovedDocument::new(
                208,
                DocumentKind::ExamReport,
                json!({
                    "participant_name": "CAMILA FERREIRA DUARTE",
                    "national_id": "999.888.777-66",
                    "exam_year": 2023
                }),
            ),
        ],
    }
}

/// Case 3: the identity card has no issuance date, so the derived expiry is
/// null and the audit must still complete with a warning.
fn missing_issuance_case() -> CaseFile {
    CaseFile {
        candidate: Candidate {
            id: 12,
            registered_name: "DIEGO ALMEIDA PRADO".to_string(),
            registered_national_id: "32165498700".to_string(),
        },
        documents: vec![
            ApprovedDocument::new(
                301,
                DocumentKind::IdentityCard,
                json!({
                    "name": "DIEGO ALMEIDA PRADO",
                    "national_id": "321.654.987-00",
                    "date_of_birth": "11/12/2002",
                    "id_number": "33.444.555-6",
                    "filiation": {
                        "mother": "LÚCIA ALMEIDA PRADO"
                    }
                }),
            ),
            ApprovedDocument::new(
                303,
                DocumentKind::Transcript,
                json!({
                    "student_name": "DIEGO ALMEIDA PRADO",
                    "institution": "ESCOLA TÉCNICA FEDERAL",
                    "completion_confirmed": true
                }),
            ),
        ],
    }
}
