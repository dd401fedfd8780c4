//! Candidate search over raw OCR text
//!
//! OCR output from a label photo is noisy: tokens run together, digit
//! counts are unreliable, and stray letters appear mid-number. The search
//! applies shape rules from most to least trusted and returns the first
//! hit: an exact-length token beats a loose-length token beats a long
//! digit run beats keyword proximity.

use std::sync::OnceLock;

use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_exact, r"\b\d{13}[A-Z]?\b");
re!(re_loose, r"\b\d{12,14}\b");
re!(re_long, r"\b\d{10,}\b");
re!(re_digit_run, r"\d+");

/// Find the most plausible tracking-number substring in raw OCR text.
///
/// The text is whitespace-collapsed, uppercased and trimmed before
/// matching. `keywords` drives the proximity fallback and is checked in
/// order against the uppercased text. Returns `None` when nothing
/// number-shaped is present — the normal outcome for an unreadable label,
/// not an error.
pub fn find_candidate(text: &str, keywords: &[String]) -> Option<String> {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    if clean.is_empty() {
        return None;
    }

    // 1. Exactly 13 digits, optionally carrying a trailing service letter.
    if let Some(m) = re_exact().find(&clean) {
        return Some(m.as_str().to_string());
    }

    // 2. A bounded token of 12-14 digits.
    if let Some(m) = re_loose().find(&clean) {
        return Some(m.as_str().to_string());
    }

    // 3. Any bounded run of 10+ digits; runs of 12 or more keep their
    //    first 13 characters.
    if let Some(m) = re_long().find(&clean) {
        let run = m.as_str();
        return Some(if run.len() >= 12 {
            run[..run.len().min(13)].to_string()
        } else {
            run.to_string()
        });
    }

    // 4. Digit runs near a marker word, word boundaries ignored. Only
    //    keywords actually present in the text split it; runs of 13 or
    //    more keep their first 13 characters.
    for keyword in keywords {
        if !clean.contains(keyword.as_str()) {
            continue;
        }
        for part in clean.split(keyword.as_str()) {
            for m in re_digit_run().find_iter(part) {
                let run = m.as_str();
                if run.len() >= 10 {
                    return Some(if run.len() >= 13 {
                        run[..13].to_string()
                    } else {
                        run.to_string()
                    });
                }
            }
        }
    }

    None
}
