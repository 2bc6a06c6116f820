//! Comparison-safe forms for claim values. Canonicalization is idempotent
//! and never validates: a short identifier stays short, an empty result just
//! drops out of equality checks.

use super::domain::ClaimKind;

/// Lower-cased, whitespace-collapsed form for free-text values.
pub fn text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Digits-only form for identifier values.
pub fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Dates keep their original textual form; parsing belongs to the
/// derived-fact layer, which tolerates unparsable input.
pub(crate) fn for_kind(kind: ClaimKind, raw: &str) -> String {
    match kind {
        ClaimKind::NationalId | ClaimKind::IdNumber => digits(raw),
        ClaimKind::DateOfBirth => raw.trim().to_string(),
        ClaimKind::Name | ClaimKind::FiliationMother | ClaimKind::FiliationFather => text(raw),
    }
}
