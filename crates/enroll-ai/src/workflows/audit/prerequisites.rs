//! Mandatory-document gate evaluated on the raw document set before any
//! harmonization work happens.

use serde_json::Value;

use super::domain::{ApprovedDocument, DocumentKind};

/// Gate verdict. On failure the message enumerates every missing
/// prerequisite, in a fixed order, rather than stopping at the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrerequisiteOutcome {
    pub met: bool,
    pub message: String,
}

impl PrerequisiteOutcome {
    fn met() -> Self {
        Self {
            met: true,
            message: String::new(),
        }
    }

    fn unmet(message: impl Into<String>) -> Self {
        Self {
            met: false,
            message: message.into(),
        }
    }
}

/// An identity card must be present, and a transcript must be present with
/// its completion flag literally true. Every other document type is optional
/// at this gate.
pub fn check(documents: &[ApprovedDocument]) -> PrerequisiteOutcome {
    if documents.is_empty() {
        return PrerequisiteOutcome::unmet("no approved documents");
    }

    let has_identity_card = documents
        .iter()
        .any(|document| document.kind == DocumentKind::IdentityCard);

    let has_completed_transcript = documents.iter().any(|document| {
        document.kind == DocumentKind::Transcript
            && document
                .field_map()
                .and_then(|fields| fields.get("completion_confirmed"))
                .and_then(Value::as_bool)
                == Some(true)
    });

    if has_identity_card && has_completed_transcript {
        return PrerequisiteOutcome::met();
    }

    let mut missing = Vec::new();
    if !has_identity_card {
        missing.push("identity card not found or not approved");
    }
    if !has_completed_transcript {
        missing.push("transcript with confirmed completion not found");
    }

    PrerequisiteOutcome::unmet(format!(
        "mandatory documents pending: {}",
        missing.join("; ")
    ))
}
