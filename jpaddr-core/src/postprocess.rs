//! Reduction of the post-town remainder to block-number form
//!
//! "十二番地三号" → "12-3", "9の1" → "9-1", "十四ーイ二十二" → "14-イ22".
//! Free text after the block number (building names) is kept as written.

use crate::dictionary::dash_class;
use crate::numerals::{convert_numerals, integer_to_kanji};
use crate::preprocess::fold_width;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Numeral run as it appears in block numbers
const NUM: &str = "[0-9〇一二三四五六七八九十百千]";

static ARABIC_CHOME: Lazy<Regex> =
    Lazy::new(|| Regex::new("([0-9]+)(丁目)").expect("arabic chome regex"));

static BANCHI_GO_WITH_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(({n}+)(番地?)({n}+)号)\s*(.+)", n = NUM)).expect("banchi go suffix regex")
});

static BANCHI_GO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("({n}+)(番地?)({n}+)号?", n = NUM)).expect("banchi go regex")
});

static BANCHI: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("({n}+)番地?", n = NUM)).expect("banchi regex"));

static NUMBER_NO: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("({n}+)の", n = NUM)).expect("number no regex"));

static NUMBER_DASH_GLYPH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("({n}+){d}", n = NUM, d = dash_class())).expect("number dash glyph regex")
});

static DASH_GLYPH_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{d}({n}+)", n = NUM, d = dash_class())).expect("dash glyph number regex")
});

static NUMBER_HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("({n}+)-", n = NUM)).expect("number hyphen regex"));

static HYPHEN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("-({n}+)", n = NUM)).expect("hyphen number regex"));

static HYPHEN_TEXT_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("-[^0-9]+({n}+)", n = NUM)).expect("hyphen text number regex")
});

static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("({n}+)$", n = NUM)).expect("trailing number regex"));

static DASH: Lazy<Regex> = Lazy::new(|| Regex::new(dash_class()).expect("dash regex"));

/// Numeral run converted, any dash glyph unified to `-`
fn convert_with_hyphen(caps: &Captures) -> String {
    DASH.replace_all(&convert_numerals(&caps[0]), "-").into_owned()
}

fn convert_match(caps: &Captures) -> String {
    convert_numerals(&caps[0])
}

/// Canonicalize the remainder left after the town stage
pub fn postprocess(remainder: &str) -> String {
    let addr = remainder.strip_prefix('-').unwrap_or(remainder);

    let addr = ARABIC_CHOME.replace_all(addr, |caps: &Captures| {
        match caps[1].parse::<u64>() {
            Ok(n) => format!("{}{}", integer_to_kanji(n), &caps[2]),
            Err(_) => caps[0].to_string(),
        }
    });
    let addr = BANCHI_GO_WITH_SUFFIX.replace(&addr, "$1 $5");
    let addr = BANCHI_GO.replace_all(&addr, "$1-$3");
    let addr = BANCHI.replace_all(&addr, "$1");
    let addr = NUMBER_NO.replace_all(&addr, "$1-");
    let addr = NUMBER_DASH_GLYPH.replace_all(&addr, convert_with_hyphen);
    let addr = DASH_GLYPH_NUMBER.replace_all(&addr, convert_with_hyphen);
    let addr = NUMBER_HYPHEN.replace(&addr, convert_match);
    let addr = HYPHEN_NUMBER.replace(&addr, convert_match);
    let addr = HYPHEN_TEXT_NUMBER.replace(&addr, |caps: &Captures| {
        convert_numerals(&fold_width(&caps[0]))
    });
    let addr = TRAILING_NUMBER.replace(&addr, convert_match);

    addr.trim().to_string()
}
