//! Rule-based correction of extracted candidates
//!
//! The OCR engine has one systematic misread on this label family: a
//! number that actually starts with "10" is read as "18". Correction
//! rewrites that prefix, reduces the candidate to its digits, and
//! completes well-formed numbers with the trailing service letter.

use tracing::debug;

use crate::types::TrackingNumber;

/// Correct an extracted candidate into its canonical form.
///
/// A 13-digit result gains the trailing "U" service letter; a 12-digit
/// result is padded with "0" before the letter. Any other digit count is
/// returned as bare digits for the caller to treat as incomplete. An
/// empty candidate yields `None`.
pub fn correct(candidate: &str) -> Option<TrackingNumber> {
    if candidate.is_empty() {
        return None;
    }

    let mut corrected = candidate.to_uppercase();

    // Leading "18" is a misread "10" on this label family. The rewrite
    // happens on the full string, before digit-stripping.
    if corrected.starts_with("18") && corrected.len() >= 3 {
        debug!(candidate, "rewriting leading 18 to 10");
        corrected.replace_range(0..2, "10");
    }

    let mut digits: String = corrected.chars().filter(char::is_ascii_digit).collect();
    digits.truncate(13);

    let value = match digits.len() {
        13 => format!("{digits}U"),
        12 => format!("{digits}0U"),
        _ => digits,
    };

    Some(TrackingNumber::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrected(candidate: &str) -> String {
        correct(candidate).unwrap().as_str().to_string()
    }

    #[test]
    fn thirteen_digits_gain_the_service_letter() {
        assert_eq!(corrected("1234567890123"), "1234567890123U");
    }

    #[test]
    fn twelve_digits_are_padded_then_suffixed() {
        assert_eq!(corrected("123456789012"), "1234567890120U");
    }

    #[test]
    fn misread_prefix_is_rewritten() {
        assert_eq!(corrected("1855747430248"), "1055747430248U");
    }

    #[test]
    fn two_character_candidate_is_not_rewritten() {
        assert_eq!(corrected("18"), "18");
    }

    #[test]
    fn prefix_rewrite_applies_before_digit_stripping() {
        assert_eq!(corrected("18A"), "10");
    }

    #[test]
    fn raw_trailing_letter_is_replaced_by_the_service_letter() {
        assert_eq!(corrected("1234567890123A"), "1234567890123U");
    }

    #[test]
    fn overlong_run_is_cut_to_thirteen() {
        assert_eq!(corrected("12345678901234"), "1234567890123U");
    }

    #[test]
    fn short_run_passes_through() {
        let number = correct("9988776655").unwrap();
        assert_eq!(number.as_str(), "9988776655");
        assert!(!number.is_complete());
    }

    #[test]
    fn empty_candidate_yields_nothing() {
        assert!(correct("").is_none());
    }

    #[test]
    fn letters_only_reduce_to_empty_digits() {
        assert_eq!(corrected("ABC"), "");
    }
}
