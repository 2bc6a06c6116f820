//! Deterministic implementation of the adjudication contract. Equality is
//! literal canonical equality; fuzzy equivalence (diacritics, honorific
//! abbreviations) is a remote-adjudicator concern and is intentionally not
//! attempted here.

use super::super::derived::parse_flexible_date;
use super::super::domain::{
    AuditOutcome, Claim, ClaimKind, ContestedDocument, Decision, DocumentKind, Finding,
    RejectionReason, RuleId, Severity,
};
use super::super::dossier::Dossier;
use super::{Adjudicator, AdjudicationError};

/// Stateless rule engine applying the enrollment consistency rulebook to
/// one dossier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyRuleEngine;

impl ConsistencyRuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every applicable rule. Rules for documents the candidate
    /// did not submit are silently skipped.
    pub fn evaluate(&self, dossier: &Dossier) -> AuditOutcome {
        let mut report = RuleReport::default();

        name_consistency(dossier, &mut report);
        national_id_consistency(dossier, &mut report);
        id_number_consistency(dossier, &mut report);
        birth_date_consistency(dossier, &mut report);
        filiation_consistency(dossier, &mut report);
        identity_card_expiry(dossier, &mut report);
        residence_proof_freshness(dossier, &mut report);
        residence_proof_titleholder(dossier, &mut report);
        transcript_completion(dossier, &mut report);
        mandatory_documents(dossier, &mut report);

        report.conclude()
    }
}

impl Adjudicator for ConsistencyRuleEngine {
    async fn adjudicate(&self, dossier: Dossier) -> Result<AuditOutcome, AdjudicationError> {
        Ok(self.evaluate(&dossier))
    }
}

/// Accumulates findings and the document types they implicate.
#[derive(Debug, Default)]
struct RuleReport {
    findings: Vec<Finding>,
    contested: Vec<ContestedDocument>,
}

impl RuleReport {
    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Record an error finding that implicates one specific document type.
    fn push_contested(&mut self, rule: RuleId, document_type: DocumentKind, detail: String) {
        if !self
            .contested
            .iter()
            .any(|contested| contested.document_type == document_type)
        {
            self.contested.push(ContestedDocument {
                document_type,
                reason: RejectionReason {
                    rule,
                    detail: detail.clone(),
                },
            });
        }
        self.findings.push(Finding::error(rule, detail));
    }

    fn conclude(self) -> AuditOutcome {
        let errors: Vec<&str> = self
            .findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
            .map(|finding| finding.detail.as_str())
            .collect();

        let (decision, explanation) = if errors.is_empty() {
            let warnings: Vec<&str> = self
                .findings
                .iter()
                .filter(|finding| finding.severity == Severity::Warning)
                .map(|finding| finding.detail.as_str())
                .collect();
            if warnings.is_empty() {
                (
                    Decision::Approved,
                    "documents are mutually consistent and pre-approved".to_string(),
                )
            } else {
                (
                    Decision::Approved,
                    format!("approved with caveats: {}", warnings.join("; ")),
                )
            }
        } else {
            (Decision::Pending, errors.join("; "))
        };

        AuditOutcome {
            findings: self.findings,
            decision,
            explanation,
            contested_documents: self.contested,
        }
    }
}

fn name_consistency(dossier: &Dossier, report: &mut RuleReport) {
    let claims = dossier.claims_of(ClaimKind::Name);
    if claims.is_empty() {
        return;
    }

    let expected = &dossier.candidate.canonical_name;
    let mismatches: Vec<&Claim> = claims
        .iter()
        .filter(|claim| claim.comparable() && claim.canonical_value != *expected)
        .collect();

    if mismatches.is_empty() {
        report.push(Finding::ok(
            RuleId::NameConsistency,
            "registered name matches every document name",
        ));
    } else {
        for claim in mismatches {
            report.push_contested(
                RuleId::NameConsistency,
                claim.source,
                format!(
                    "name on {} ('{}') differs from the registered name ('{}')",
                    claim.source.label(),
                    claim.raw_value,
                    dossier.candidate.name
                ),
            );
        }
    }
}

fn national_id_consistency(dossier: &Dossier, report: &mut RuleReport) {
    let claims = dossier.claims_of(ClaimKind::NationalId);
    let comparable: Vec<&Claim> = claims.iter().filter(|claim| claim.comparable()).collect();
    if comparable.is_empty() {
        return;
    }

    let expected = &dossier.candidate.canonical_national_id;
    let mismatches: Vec<&&Claim> = comparable
        .iter()
        .filter(|claim| claim.canonical_value != *expected)
        .collect();

    if mismatches.is_empty() {
        report.push(Finding::ok(
            RuleId::NationalIdConsistency,
            "registered national id matches every document national id",
        ));
    } else {
        for claim in mismatches {
            report.push_contested(
                RuleId::NationalIdConsistency,
                claim.source,
                format!(
                    "national id on {} ({}) differs from the registered national id ({})",
                    claim.source.label(),
                    claim.canonical_value,
                    expected
                ),
            );
        }
    }
}

fn id_number_consistency(dossier: &Dossier, report: &mut RuleReport) {
    let comparable: Vec<&Claim> = dossier
        .claims_of(ClaimKind::IdNumber)
        .iter()
        .filter(|claim| claim.comparable())
        .collect();

    // Only a cross-check: a single id number has nothing to disagree with.
    let Some((reference, rest)) = comparable.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }

    let mismatches: Vec<&&Claim> = rest
        .iter()
        .filter(|claim| claim.canonical_value != reference.canonical_value)
        .collect();

    if mismatches.is_empty() {
        report.push(Finding::ok(
            RuleId::IdNumberConsistency,
            "id numbers agree across documents",
        ));
    } else {
        for claim in mismatches {
            report.push_contested(
                RuleId::IdNumberConsistency,
                claim.source,
                format!(
                    "id number on {} ({}) differs from the one on {} ({})",
                    claim.source.label(),
                    claim.canonical_value,
                    reference.source.label(),
                    reference.canonical_value
                ),
            );
        }
    }
}

fn birth_date_consistency(dossier: &Dossier, report: &mut RuleReport) {
    let mut parsed = Vec::new();
    for claim in dossier.claims_of(ClaimKind::DateOfBirth) {
        match parse_flexible_date(&claim.raw_value) {
            Some(date) => parsed.push((claim, date)),
            None => report.push(Finding::warning(
                RuleId::BirthDateConsistency,
                format!(
                    "birth date on {} ('{}') could not be parsed",
                    claim.source.label(),
                    claim.raw_value
                ),
            )),
        }
    }

    let Some(((reference, reference_date), rest)) = parsed.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }

    let mut consistent = true;
    for (claim, date) in rest {
        if date != reference_date {
            consistent = false;
            report.push_contested(
                RuleId::BirthDateConsistency,
                claim.source,
                format!(
                    "birth date on {} ({}) differs from the one on {} ({})",
                    claim.source.label(),
                    date,
                    reference.source.label(),
                    reference_date
                ),
            );
        }
    }

    if consistent {
        report.push(Finding::ok(
            RuleId::BirthDateConsistency,
            "birth dates agree across documents",
        ));
    }
}

fn filiation_consistency(dossier: &Dossier, report: &mut RuleReport) {
    for (kind, role) in [
        (ClaimKind::FiliationMother, "mother"),
        (ClaimKind::FiliationFather, "father"),
    ] {
        let comparable: Vec<&Claim> = dossier
            .claims_of(kind)
            .iter()
            .filter(|claim| claim.comparable())
            .collect();

        let Some((reference, rest)) = comparable.split_first() else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }

        let mut consistent = true;
        for claim in rest {
            if claim.canonical_value != reference.canonical_value {
                consistent = false;
                report.push_contested(
                    RuleId::FiliationConsistency,
                    claim.source,
                    format!(
                        "{role} name on {} ('{}') differs from the one on {} ('{}')",
                        claim.source.label(),
                        claim.raw_value,
                        reference.source.label(),
                        reference.raw_value
                    ),
                );
            }
        }

        if consistent {
            report.push(Finding::ok(
                RuleId::FiliationConsistency,
                format!("{role} name agrees across documents"),
            ));
        }
    }
}

fn identity_card_expiry(dossier: &Dossier, report: &mut RuleReport) {
    if !dossier.has_document(DocumentKind::IdentityCard) {
        return;
    }

    let dates = &dossier.reference_dates;
    let expiry = dossier
        .derived
        .identity_card
        .as_ref()
        .and_then(|facts| facts.expiry_date);

    match expiry {
        None => report.push(Finding::warning(
            RuleId::IdentityCardExpiry,
            "identity card expiry could not be derived from its issuance date",
        )),
        Some(expiry) if expiry < dates.as_of => report.push_contested(
            RuleId::IdentityCardExpiry,
            DocumentKind::IdentityCard,
            format!("identity card expired on {expiry}"),
        ),
        Some(expiry) if expiry < dates.program_end_ceiling => report.push(Finding::warning(
            RuleId::IdentityCardExpiry,
            format!(
                "identity card expires on {expiry}, before the nominal program end ({})",
                dates.program_end_ceiling
            ),
        )),
        Some(_) => report.push(Finding::ok(
            RuleId::IdentityCardExpiry,
            "identity card is valid through the nominal program window",
        )),
    }
}

fn residence_proof_freshness(dossier: &Dossier, report: &mut RuleReport) {
    if !dossier.has_document(DocumentKind::ResidenceProof) {
        return;
    }

    let dates = &dossier.reference_dates;
    let issued = dossier
        .derived
        .residence_proof
        .as_ref()
        .and_then(|facts| facts.issuance_date);

    match issued {
        None => report.push(Finding::warning(
            RuleId::ResidenceProofFreshness,
            "residence proof issuance date is missing or unparsable",
        )),
        Some(issued) if issued < dates.residence_freshness_floor => report.push_contested(
            RuleId::ResidenceProofFreshness,
            DocumentKind::ResidenceProof,
            format!(
                "residence proof issued on {issued} is older than the {} freshness floor",
                dates.residence_freshness_floor
            ),
        ),
        Some(_) => report.push(Finding::ok(
            RuleId::ResidenceProofFreshness,
            "residence proof is recent",
        )),
    }
}

fn residence_proof_titleholder(dossier: &Dossier, report: &mut RuleReport) {
    if !dossier.has_document(DocumentKind::ResidenceProof) {
        return;
    }

    let facts = dossier.derived.residence_proof.as_ref();
    let titleholder = facts.and_then(|facts| facts.titleholder_canonical.as_deref());

    match titleholder {
        None => report.push(Finding::warning(
            RuleId::ResidenceProofTitleholder,
            "residence proof titleholder could not be extracted",
        )),
        Some(titleholder) if dossier.valid_titleholders.contains(titleholder) => {
            report.push(Finding::ok(
                RuleId::ResidenceProofTitleholder,
                "residence proof is titled to the candidate or a declared parent",
            ));
        }
        Some(_) => {
            let raw = facts
                .and_then(|facts| facts.titleholder.as_deref())
                .unwrap_or_default();
            report.push_contested(
                RuleId::ResidenceProofTitleholder,
                DocumentKind::ResidenceProof,
                format!(
                    "residence proof is titled to '{raw}', who is neither the candidate nor a declared parent"
                ),
            );
        }
    }
}

fn transcript_completion(dossier: &Dossier, report: &mut RuleReport) {
    if !dossier.has_document(DocumentKind::Transcript) {
        return;
    }

    let completed = dossier
        .derived
        .transcript
        .as_ref()
        .is_some_and(|facts| facts.completion_confirmed);

    if completed {
        report.push(Finding::ok(
            RuleId::TranscriptCompletion,
            "transcript confirms completion",
        ));
    } else {
        report.push_contested(
            RuleId::TranscriptCompletion,
            DocumentKind::Transcript,
            "transcript does not confirm completion".to_string(),
        );
    }
}

fn mandatory_documents(dossier: &Dossier, report: &mut RuleReport) {
    let mut missing = Vec::new();
    if !dossier.has_document(DocumentKind::IdentityCard) {
        missing.push(DocumentKind::IdentityCard.label());
    }
    if !dossier.has_document(DocumentKind::Transcript) {
        missing.push(DocumentKind::Transcript.label());
    }

    if missing.is_empty() {
        report.push(Finding::ok(
            RuleId::MandatoryDocuments,
            "mandatory documents are present",
        ));
    } else {
        report.push(Finding::error(
            RuleId::MandatoryDocuments,
            format!("mandatory documents missing: {}", missing.join(", ")),
        ));
    }
}
