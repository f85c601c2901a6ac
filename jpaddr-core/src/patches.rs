//! Hand-verified corrections for known catalog idiosyncrasies
//!
//! A few towns have sub-areas whose names end in a numeral (家六, 梶村一).
//! Block-number canonicalization turns those into digits; each patch puts
//! the name back for one (prefecture, city, town) triple.

use once_cell::sync::Lazy;
use regex::Regex;

struct AddressPatch {
    pref: &'static str,
    city: &'static str,
    town: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

static ADDRESS_PATCHES: Lazy<Vec<AddressPatch>> = Lazy::new(|| {
    [
        ("香川県", "仲多度郡まんのう町", "勝浦", "^字?家6", "家六"),
        ("愛知県", "あま市", "西今宿", "^字?梶村1", "梶村一"),
        ("香川県", "丸亀市", "原田町", "^字?東三分1", "東三分一"),
    ]
    .into_iter()
    .map(|(pref, city, town, pattern, replacement)| AddressPatch {
        pref,
        city,
        town,
        pattern: Regex::new(pattern).expect("address patch regex"),
        replacement,
    })
    .collect()
});

/// Apply the first patch registered for this triple, if any
pub fn patch(pref: &str, city: &str, town: &str, addr: &str) -> String {
    ADDRESS_PATCHES
        .iter()
        .find(|p| p.pref == pref && p.city == city && p.town == town)
        .map(|p| p.pattern.replace(addr, p.replacement).into_owned())
        .unwrap_or_else(|| addr.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_applies_to_matching_triple() {
        assert_eq!(patch("香川県", "仲多度郡まんのう町", "勝浦", "字家6"), "家六");
        assert_eq!(patch("愛知県", "あま市", "西今宿", "梶村1-2"), "梶村一-2");
        assert_eq!(patch("香川県", "丸亀市", "原田町", "東三分1"), "東三分一");
    }

    #[test]
    fn test_patch_ignores_other_triples() {
        assert_eq!(patch("香川県", "丸亀市", "勝浦", "字家6"), "字家6");
        assert_eq!(patch("", "", "", "梶村1"), "梶村1");
    }

    #[test]
    fn test_patch_pattern_must_match() {
        assert_eq!(patch("香川県", "仲多度郡まんのう町", "勝浦", "123"), "123");
    }
}
