use crate::workflows::audit::canonical;
use crate::workflows::audit::domain::{Claim, ClaimKind, DocumentKind};

#[test]
fn text_lowercases_and_collapses_whitespace() {
    assert_eq!(canonical::text("  JOSÉ   da  Silva "), "josé da silva");
}

#[test]
fn text_strips_zero_width_characters() {
    assert_eq!(canonical::text("\u{feff}Maria\u{200b} Gomes"), "maria gomes");
}

#[test]
fn digits_strips_every_non_digit() {
    assert_eq!(canonical::digits("123.456.789-00"), "12345678900");
    assert_eq!(canonical::digits("11.222.333-4"), "112223334");
    assert_eq!(canonical::digits("no digits"), "");
}

#[test]
fn canonicalization_is_idempotent() {
    for value in ["  BRUNO  Gomes DA SILVA ", "josé", "123.456.789-00", ""] {
        let once = canonical::text(value);
        assert_eq!(canonical::text(&once), once);

        let once = canonical::digits(value);
        assert_eq!(canonical::digits(&once), once);
    }
}

#[test]
fn punctuated_and_bare_national_ids_canonicalize_identically() {
    let punctuated = Claim::new(
        ClaimKind::NationalId,
        "123.456.789-00",
        DocumentKind::IdentityCard,
    );
    let bare = Claim::new(ClaimKind::NationalId, "12345678900", DocumentKind::ExamReport);
    assert_eq!(punctuated.canonical_value, bare.canonical_value);
}

#[test]
fn short_identifier_is_retained_but_empty_is_not_comparable() {
    let short = Claim::new(ClaimKind::NationalId, "123", DocumentKind::IdentityCard);
    assert_eq!(short.canonical_value, "123");
    assert!(short.comparable());

    let empty = Claim::new(ClaimKind::NationalId, "---", DocumentKind::IdentityCard);
    assert!(empty.canonical_value.is_empty());
    assert!(!empty.comparable());
}

#[test]
fn dates_keep_their_original_textual_form() {
    let claim = Claim::new(
        ClaimKind::DateOfBirth,
        " 20/04/2003 ",
        DocumentKind::BirthCertificate,
    );
    assert_eq!(claim.canonical_value, "20/04/2003");
}
