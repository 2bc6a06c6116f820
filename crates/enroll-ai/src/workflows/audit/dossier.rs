//! Aggregation of every claim and derived fact into the canonical dossier
//! submitted for adjudication. Building a dossier is pure: no I/O, no
//! external calls, and the same inputs always produce the same value.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::canonical;
use super::claims::extract_claims;
use super::derived::DerivedFacts;
use super::domain::{ApprovedDocument, Candidate, Claim, ClaimKind, DocumentKind};

/// Nominal program duration used as the ceiling for expiry warnings.
const PROGRAM_DURATION_MONTHS: u32 = 48;

/// Residence proofs older than this are stale.
const RESIDENCE_FRESHNESS_MONTHS: u32 = 3;

/// Calendar anchors every date rule compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDates {
    pub as_of: NaiveDate,
    pub program_end_ceiling: NaiveDate,
    pub residence_freshness_floor: NaiveDate,
}

impl ReferenceDates {
    pub fn for_run(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            program_end_ceiling: as_of
                .checked_add_months(Months::new(PROGRAM_DURATION_MONTHS))
                .unwrap_or(as_of),
            residence_freshness_floor: as_of
                .checked_sub_months(Months::new(RESIDENCE_FRESHNESS_MONTHS))
                .unwrap_or(as_of),
        }
    }
}

/// The candidate's registered identity in both raw and canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIdentity {
    pub id: u64,
    pub name: String,
    pub canonical_name: String,
    pub national_id: String,
    pub canonical_national_id: String,
}

impl From<&Candidate> for CandidateIdentity {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.registered_name.clone(),
            canonical_name: canonical::text(&candidate.registered_name),
            national_id: candidate.registered_national_id.clone(),
            canonical_national_id: canonical::digits(&candidate.registered_national_id),
        }
    }
}

/// The harmonized snapshot of one candidate's approved documents. A value
/// object: never mutated after the builder returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dossier {
    pub reference_dates: ReferenceDates,
    pub candidate: CandidateIdentity,
    pub claims: BTreeMap<ClaimKind, Vec<Claim>>,
    pub derived: DerivedFacts,
    /// Canonical names entitled to appear on a residence proof: the
    /// candidate plus every declared parent.
    pub valid_titleholders: BTreeSet<String>,
    pub documents_present: BTreeSet<String>,
}

impl Dossier {
    pub fn claims_of(&self, kind: ClaimKind) -> &[Claim] {
        self.claims.get(&kind).map_or(&[], Vec::as_slice)
    }

    pub fn has_document(&self, kind: DocumentKind) -> bool {
        self.documents_present.contains(kind.label())
    }
}

/// Build the dossier for one run. Documents whose field payload is not a
/// JSON object are logged and excluded; they never fail the run.
pub fn build_dossier(
    candidate: &Candidate,
    documents: &[ApprovedDocument],
    as_of: NaiveDate,
) -> Dossier {
    let mut claims: BTreeMap<ClaimKind, Vec<Claim>> = BTreeMap::new();
    let mut derived = DerivedFacts::default();
    let mut documents_present = BTreeSet::new();

    for document in documents {
        if document.field_map().is_none() {
            warn!(
                document_id = document.id,
                kind = document.kind.label(),
                "skipping document with malformed field payload"
            );
            continue;
        }

        documents_present.insert(document.kind.label().to_string());
        for claim in extract_claims(document) {
            claims.entry(claim.kind).or_default().push(claim);
        }
        derived.ingest(document);
    }

    let candidate_identity = CandidateIdentity::from(candidate);

    let mut valid_titleholders = BTreeSet::new();
    valid_titleholders.insert(candidate_identity.canonical_name.clone());
    for kind in [ClaimKind::FiliationMother, ClaimKind::FiliationFather] {
        for claim in claims.get(&kind).into_iter().flatten() {
            if claim.comparable() {
                valid_titleholders.insert(claim.canonical_value.clone());
            }
        }
    }

    Dossier {
        reference_dates: ReferenceDates::for_run(as_of),
        candidate: candidate_identity,
        claims,
        derived,
        valid_titleholders,
        documents_present,
    }
}
