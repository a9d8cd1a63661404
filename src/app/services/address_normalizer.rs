//! Delivery address canonicalization
//!
//! Maps a free-text delivery address to the canonical form used for equality
//! and similarity comparison. The rewriting is an ordered list of stages whose
//! order matters: later stages re-match tokens produced by earlier ones.
//!
//! 1. Strip everything but letters, digits, numeric symbols, underscore and
//!    whitespace, then uppercase.
//! 2. Delete short street suffixes (ST, AVE, RD, ...).
//! 3. Expand abbreviations, directionals and unit words to full words.
//! 4. Delete the expanded street suffixes (STREET, AVENUE, ...).
//! 5. Rewrite unit markers (STE, APARTMENT, UNIT, `#`) as SUITE.
//! 6. Collapse whitespace.
//!
//! All token rules match whole words only, so `STREETLIGHT` is never touched.

use regex::Regex;
use std::sync::LazyLock;

/// Short street suffixes deleted before expansion
const SHORT_SUFFIXES: &[&str] = &[
    "ST", "AVE", "RD", "BLVD", "DR", "LN", "CT", "PL", "TER", "CIR", "SQ",
];

/// Abbreviation expansions, applied in this order
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("ST", "STREET"),
    ("AVE", "AVENUE"),
    ("RD", "ROAD"),
    ("BLVD", "BOULEVARD"),
    ("DR", "DRIVE"),
    ("LN", "LANE"),
    ("CT", "COURT"),
    ("PL", "PLACE"),
    ("TER", "TERRACE"),
    ("S", "SOUTH"),
    ("N", "NORTH"),
    ("E", "EAST"),
    ("W", "WEST"),
    ("APT", "APARTMENT"),
    ("BLDG", "BUILDING"),
    ("DEPT", "DEPARTMENT"),
    ("PKWY", "PARKWAY"),
    ("EXPY", "EXPRESSWAY"),
    ("CIR", "CIRCLE"),
    ("HGTS", "HEIGHTS"),
    ("HL", "HILL"),
    ("JCT", "JUNCTION"),
    ("MT", "MOUNT"),
    ("SQ", "SQUARE"),
    ("FT", "FORT"),
    ("NW", "NORTHWEST"),
    ("NE", "NORTHEAST"),
    ("SW", "SOUTHWEST"),
    ("SE", "SOUTHEAST"),
];

/// Expanded street suffixes deleted after expansion
const EXPANDED_SUFFIXES: &[&str] = &[
    "STREET",
    "AVENUE",
    "ROAD",
    "BOULEVARD",
    "DRIVE",
    "LANE",
    "COURT",
    "PLACE",
    "TERRACE",
    "CIRCLE",
    "SQUARE",
];

/// Unit markers rewritten as SUITE; `#` is matched anywhere, not as a word
const SUITE_PATTERNS: &[&str] = &[r"\bSTE\b", r"\bAPARTMENT\b", r"\bUNIT\b", "#"];

const SUITE_REPLACEMENT: &str = " SUITE ";

/// A single regex rewrite
#[derive(Debug)]
struct RewriteRule {
    pattern: Regex,
    replacement: &'static str,
}

impl RewriteRule {
    fn whole_word(token: &str, replacement: &'static str) -> Self {
        Self::raw(&format!(r"\b{}\b", regex::escape(token)), replacement)
    }

    fn raw(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("static address rule must compile"),
            replacement,
        }
    }

    fn apply(&self, input: String) -> String {
        if self.pattern.is_match(&input) {
            self.pattern
                .replace_all(&input, self.replacement)
                .into_owned()
        } else {
            input
        }
    }
}

/// Anything but letters, digits, numeric symbols, underscore and whitespace
///
/// Combining marks are not letters here, so a decomposed `E\u{301}` keeps
/// only its base letter.
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{Alphabetic}\p{Nd}\p{No}\p{Nl}_\s]")
        .expect("static address rule must compile")
});

/// Stages 2 through 5, flattened into one ordered rule list
static TOKEN_RULES: LazyLock<Vec<RewriteRule>> = LazyLock::new(|| {
    let short = SHORT_SUFFIXES
        .iter()
        .map(|token| RewriteRule::whole_word(token, ""));
    let expand = ABBREVIATIONS
        .iter()
        .map(|(token, full)| RewriteRule::whole_word(token, full));
    let expanded = EXPANDED_SUFFIXES
        .iter()
        .map(|token| RewriteRule::whole_word(token, ""));
    let suite = SUITE_PATTERNS
        .iter()
        .map(|pattern| RewriteRule::raw(pattern, SUITE_REPLACEMENT));

    short.chain(expand).chain(expanded).chain(suite).collect()
});

/// Canonicalize a raw delivery address
///
/// Total and deterministic: the result depends on `raw` only, and empty or
/// unexpected input degrades to an empty or token-free uppercase string.
///
/// # Examples
///
/// ```
/// use gln_recon::normalize_address;
///
/// assert_eq!(normalize_address("123 Main St"), "123 MAIN");
/// assert_eq!(normalize_address("456 N Elm Avenue Apt 2"), "456 NORTH ELM SUITE 2");
/// ```
pub fn normalize_address(raw: &str) -> String {
    let mut address = PUNCTUATION.replace_all(raw, "").to_uppercase();

    for rule in TOKEN_RULES.iter() {
        address = rule.apply(address);
    }

    address.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stateless handle over [`normalize_address`]
///
/// Useful where a normalizer is passed around as a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressNormalizer;

impl AddressNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_address(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_suffix_removed() {
        assert_eq!(normalize_address("123 Main St"), "123 MAIN");
        assert_eq!(normalize_address("123 Main St."), "123 MAIN");
        assert_eq!(normalize_address("9 Oak Blvd"), "9 OAK");
    }

    #[test]
    fn test_directional_expanded_and_unit_converted() {
        assert_eq!(
            normalize_address("456 N Elm Avenue Apt 2"),
            "456 NORTH ELM SUITE 2"
        );
        assert_eq!(normalize_address("10 SW Pine"), "10 SOUTHWEST PINE");
    }

    #[test]
    fn test_expanded_suffix_removed() {
        assert_eq!(normalize_address("123 Main Street"), "123 MAIN");
        assert_eq!(normalize_address("77 Lake Terrace"), "77 LAKE");
        assert_eq!(normalize_address("5 Market Square"), "5 MARKET");
    }

    #[test]
    fn test_unit_markers_become_suite() {
        assert_eq!(normalize_address("1 Main St Ste 200"), "1 MAIN SUITE 200");
        assert_eq!(normalize_address("1 Main St Unit 4B"), "1 MAIN SUITE 4B");
        // '#' is stripped with the rest of the punctuation before rewriting
        assert_eq!(normalize_address("1 Main St #4"), "1 MAIN 4");
    }

    #[test]
    fn test_other_abbreviations_expanded() {
        assert_eq!(
            normalize_address("200 Commerce Pkwy Bldg C"),
            "200 COMMERCE PARKWAY BUILDING C"
        );
        assert_eq!(normalize_address("Ft Worth Hgts"), "FORT WORTH HEIGHTS");
        assert_eq!(normalize_address("3 Mt Vernon Jct"), "3 MOUNT VERNON JUNCTION");
    }

    #[test]
    fn test_embedded_tokens_untouched() {
        assert_eq!(normalize_address("1 Streetlight Ln"), "1 STREETLIGHT");
        assert_eq!(normalize_address("40 Stewart Dr"), "40 STEWART");
        assert_eq!(normalize_address("Avenel Ct"), "AVENEL");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_address("  12   Oak\t\tRd  "), "12 OAK");
        assert_eq!(normalize_address("12 Oak\nRd"), "12 OAK");
    }

    #[test]
    fn test_degenerate_input() {
        assert_eq!(normalize_address(""), "");
        assert_eq!(normalize_address("   "), "");
        assert_eq!(normalize_address("!!!"), "");
        assert_eq!(normalize_address("St Ave Rd"), "");
    }

    #[test]
    fn test_unicode_digits_and_combining_marks() {
        assert_eq!(normalize_address("12½ Main St"), "12½ MAIN");
        assert_eq!(normalize_address("Rue E\u{301}glise"), "RUE EGLISE");
        assert_eq!(normalize_address("Rue Église"), "RUE ÉGLISE");
        assert_eq!(normalize_address("Block_7 Main"), "BLOCK_7 MAIN");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "123 Main St",
            "456 N Elm Avenue Apt 2",
            "PO Box 17, Dept 4",
            "1 W 2nd St Unit 3, Bldg B",
            "88 NE Harbor Cir Ste. 10",
            "",
            "Rue de l'Église 4",
        ];
        for sample in samples {
            let once = normalize_address(sample);
            assert_eq!(normalize_address(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_normalizer_handle_matches_function() {
        let normalizer = AddressNormalizer::new();
        assert_eq!(normalizer.normalize("12 Oak Rd"), normalize_address("12 Oak Rd"));
    }
}
