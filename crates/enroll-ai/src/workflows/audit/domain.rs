use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::canonical;

/// Identifier wrapper for enrollment cases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CaseId(pub u64);

/// Candidate registration data as recorded at sign-up. Immutable input for
/// one audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u64,
    pub registered_name: String,
    pub registered_national_id: String,
}

/// Document types the audit understands. Discriminant values mirror the
/// enrollment store's document-type ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    IdentityCard,
    Transcript,
    ResidenceProof,
    MilitaryCertificate,
    BirthCertificate,
    ExamReport,
}

impl DocumentKind {
    pub const fn type_id(self) -> u16 {
        match self {
            DocumentKind::IdentityCard => 1,
            DocumentKind::Transcript => 3,
            DocumentKind::ResidenceProof => 4,
            DocumentKind::MilitaryCertificate => 6,
            DocumentKind::BirthCertificate => 7,
            DocumentKind::ExamReport => 8,
        }
    }

    pub const fn from_type_id(type_id: u16) -> Option<Self> {
        match type_id {
            1 => Some(DocumentKind::IdentityCard),
            3 => Some(DocumentKind::Transcript),
            4 => Some(DocumentKind::ResidenceProof),
            6 => Some(DocumentKind::MilitaryCertificate),
            7 => Some(DocumentKind::BirthCertificate),
            8 => Some(DocumentKind::ExamReport),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DocumentKind::IdentityCard => "identity_card",
            DocumentKind::Transcript => "transcript",
            DocumentKind::ResidenceProof => "residence_proof",
            DocumentKind::MilitaryCertificate => "military_certificate",
            DocumentKind::BirthCertificate => "birth_certificate",
            DocumentKind::ExamReport => "exam_report",
        }
    }
}

/// One approved document together with the field payload the Document
/// Extraction Service produced for it. The payload shape varies per type and
/// may be arbitrarily nested; anything other than a JSON object is treated
/// as malformed and skipped during harmonization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedDocument {
    pub id: u64,
    pub kind: DocumentKind,
    pub type_name: String,
    pub fields: Value,
}

impl ApprovedDocument {
    pub fn new(id: u64, kind: DocumentKind, fields: Value) -> Self {
        Self {
            id,
            kind,
            type_name: kind.label().to_string(),
            fields,
        }
    }

    /// The field payload as an object, or `None` when malformed.
    pub fn field_map(&self) -> Option<&Map<String, Value>> {
        self.fields.as_object()
    }
}

/// Kinds of assertion one document can make about the candidate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    Name,
    NationalId,
    DateOfBirth,
    FiliationMother,
    FiliationFather,
    IdNumber,
}

/// A single typed assertion extracted from one document. The raw value is
/// preserved for human-facing output; the canonical value is the sole basis
/// for equality across documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub kind: ClaimKind,
    pub raw_value: String,
    pub canonical_value: String,
    pub source: DocumentKind,
}

impl Claim {
    pub fn new(kind: ClaimKind, raw_value: impl Into<String>, source: DocumentKind) -> Self {
        let raw_value = raw_value.into();
        let canonical_value = canonical::for_kind(kind, &raw_value);
        Self {
            kind,
            raw_value,
            canonical_value,
            source,
        }
    }

    /// An empty canonical form is unusable for equality comparison.
    pub fn comparable(&self) -> bool {
        !self.canonical_value.is_empty()
    }
}

/// Severity of one adjudication finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Stable rule identifiers so explanations stay reproducible across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    NameConsistency,
    NationalIdConsistency,
    IdNumberConsistency,
    BirthDateConsistency,
    FiliationConsistency,
    IdentityCardExpiry,
    ResidenceProofFreshness,
    ResidenceProofTitleholder,
    TranscriptCompletion,
    MandatoryDocuments,
}

/// One rule-evaluation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub rule: RuleId,
    pub detail: String,
}

impl Finding {
    pub fn ok(rule: RuleId, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Ok,
            rule,
            detail: detail.into(),
        }
    }

    pub fn warning(rule: RuleId, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            rule,
            detail: detail.into(),
        }
    }

    pub fn error(rule: RuleId, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            rule,
            detail: detail.into(),
        }
    }
}

/// Final audit decision for a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Pending,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Pending => "pending",
        }
    }
}

/// Machine-readable reason attached to a rejected document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason {
    pub rule: RuleId,
    pub detail: String,
}

/// A document type the adjudicator found contradictory. The adjudicator only
/// sees the dossier, so it names types; the persist step maps types back to
/// the concrete documents fetched for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestedDocument {
    pub document_type: DocumentKind,
    pub reason: RejectionReason,
}

/// Outcome returned by the Adjudication Service for one dossier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub findings: Vec<Finding>,
    pub decision: Decision,
    pub explanation: String,
    #[serde(default)]
    pub contested_documents: Vec<ContestedDocument>,
}

impl AuditOutcome {
    pub fn blocking_findings(&self) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
            .count()
    }

    /// `approved` iff no error-severity finding.
    pub fn satisfies_decision_contract(&self) -> bool {
        match self.decision {
            Decision::Approved => self.blocking_findings() == 0,
            Decision::Pending => self.blocking_findings() > 0,
        }
    }
}

/// Rejection side effect resolved against one concrete document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRejection {
    pub document_id: u64,
    pub reason: RejectionReason,
}

/// The record the decision sink stores for a case; re-writing the same
/// record is idempotent (last write wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision: Decision,
    pub explanation: String,
    pub decided_at: DateTime<Utc>,
}

/// Everything the invoking layer learns from one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub case_id: CaseId,
    pub decision: Decision,
    pub explanation: String,
    pub findings: Vec<Finding>,
    pub prerequisites_met: bool,
    pub decided_at: DateTime<Utc>,
}
