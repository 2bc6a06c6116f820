//! Document-type-specific derived facts, computed once per run from the raw
//! field payloads. Unparsable dates degrade to `None`; they never abort the
//! run.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::canonical;
use super::claims::string_field;
use super::domain::{ApprovedDocument, DocumentKind};

/// Identity cards are valid for ten years from issuance.
const IDENTITY_CARD_VALIDITY_MONTHS: u32 = 120;

/// Issuance and emission dates arrive in day/month/year form.
pub(crate) fn parse_day_month_year(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").ok()
}

/// Birth dates show up in whichever format the issuing registry used.
pub(crate) fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];
    let trimmed = raw.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCardFacts {
    /// Issuance date plus ten years; `None` when issuance is absent or
    /// unparsable.
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptFacts {
    pub completion_confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidenceProofFacts {
    pub titleholder: Option<String>,
    pub titleholder_canonical: Option<String>,
    /// National id printed on the bill; may belong to a third party.
    pub linked_national_id: Option<String>,
    pub issuance_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilitaryCertificateFacts {
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthCertificateFacts {
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamReportFacts {
    pub present: bool,
    pub exam_year: Option<i64>,
}

/// Facts grouped by document type. A type the candidate did not submit stays
/// `None`; duplicate submissions of one type resolve last-write-wins in
/// document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_card: Option<IdentityCardFacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<TranscriptFacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residence_proof: Option<ResidenceProofFacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub military_certificate: Option<MilitaryCertificateFacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_certificate: Option<BirthCertificateFacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_report: Option<ExamReportFacts>,
}

impl DerivedFacts {
    /// Fold one document's facts in. Malformed payloads contribute nothing.
    pub fn ingest(&mut self, document: &ApprovedDocument) {
        let Some(fields) = document.field_map() else {
            return;
        };

        match document.kind {
            DocumentKind::IdentityCard => {
                let expiry_date = string_field(fields, "issuance_date")
                    .and_then(parse_day_month_year)
                    .and_then(|issued| {
                        issued.checked_add_months(Months::new(IDENTITY_CARD_VALIDITY_MONTHS))
                    });
                self.identity_card = Some(IdentityCardFacts { expiry_date });
            }
            DocumentKind::Transcript => {
                let completion_confirmed = fields
                    .get("completion_confirmed")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                self.transcript = Some(TranscriptFacts {
                    completion_confirmed,
                });
            }
            DocumentKind::ResidenceProof => {
                let titleholder = string_field(fields, "titleholder_name").map(str::to_string);
                let titleholder_canonical = titleholder.as_deref().map(canonical::text);
                let linked_national_id = string_field(fields, "linked_national_id")
                    .map(canonical::digits)
                    .filter(|digits| !digits.is_empty());
                let issuance_date =
                    string_field(fields, "issuance_date").and_then(parse_day_month_year);
                self.residence_proof = Some(ResidenceProofFacts {
                    titleholder,
                    titleholder_canonical,
                    linked_national_id,
                    issuance_date,
                });
            }
            DocumentKind::MilitaryCertificate => {
                self.military_certificate = Some(MilitaryCertificateFacts { present: true });
            }
            DocumentKind::BirthCertificate => {
                self.birth_certificate = Some(BirthCertificateFacts { present: true });
            }
            DocumentKind::ExamReport => {
                let exam_year = fields.get("exam_year").and_then(Value::as_i64);
                self.exam_report = Some(ExamReportFacts {
                    present: true,
                    exam_year,
                });
            }
        }
    }
}
