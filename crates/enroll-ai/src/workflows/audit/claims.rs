//! Maps one document's heterogeneous field payload into typed claims.
//! Extraction is total: unknown or absent fields never fail, they simply
//! produce no claim.

use serde_json::{Map, Value};

use super::domain::{ApprovedDocument, Claim, ClaimKind, DocumentKind};

/// Name keys across the document-type schemas, generic fallbacks included.
const NAME_KEYS: [&str; 4] = ["name", "student_name", "participant_name", "registrant_name"];

/// Identity-card number keys; extraction services disagree on the label.
const ID_NUMBER_KEYS: [&str; 4] = [
    "id_number",
    "registration",
    "registration_number",
    "document_number",
];

/// Extract every claim the document makes about the candidate.
pub fn extract_claims(document: &ApprovedDocument) -> Vec<Claim> {
    let Some(fields) = document.field_map() else {
        return Vec::new();
    };

    let mut claims = Vec::new();

    if let Some(raw) = name_field(fields, document.kind) {
        claims.push(Claim::new(ClaimKind::Name, raw, document.kind));
    }

    // `linked_national_id` is deliberately not read here: on a residence
    // proof it may legitimately belong to a parent or guardian, so it feeds
    // the titleholder facts instead of the identity cross-checks.
    if let Some(raw) = string_field(fields, "national_id") {
        claims.push(Claim::new(ClaimKind::NationalId, raw, document.kind));
    }

    if let Some(raw) = string_field(fields, "date_of_birth") {
        claims.push(Claim::new(ClaimKind::DateOfBirth, raw, document.kind));
    }

    if let Some(Value::Object(filiation)) = fields.get("filiation") {
        if let Some(mother) = string_field(filiation, "mother") {
            claims.push(Claim::new(ClaimKind::FiliationMother, mother, document.kind));
        }
        if let Some(father) = string_field(filiation, "father") {
            claims.push(Claim::new(ClaimKind::FiliationFather, father, document.kind));
        }
    }

    if let Some(raw) = first_string_field(fields, &ID_NUMBER_KEYS) {
        claims.push(Claim::new(ClaimKind::IdNumber, raw, document.kind));
    }

    claims
}

/// The document-type-specific name key wins when several are present.
fn name_field(fields: &Map<String, Value>, kind: DocumentKind) -> Option<&str> {
    let preferred = match kind {
        DocumentKind::Transcript => "student_name",
        DocumentKind::ExamReport => "participant_name",
        DocumentKind::BirthCertificate => "registrant_name",
        _ => "name",
    };

    string_field(fields, preferred).or_else(|| first_string_field(fields, &NAME_KEYS))
}

/// A non-empty string value for the key, trimmed of surrounding whitespace.
pub(crate) fn string_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    match fields.get(key) {
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        }
        _ => None,
    }
}

fn first_string_field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| string_field(fields, key))
}
