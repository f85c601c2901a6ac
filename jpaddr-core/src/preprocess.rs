//! Input canonicalization, applied once before matching
//!
//! Rules run in order, each once:
//! 1. whitespace runs → one ASCII space (ends trimmed)
//! 2. full-width ASCII letters and digits → half-width
//! 3. dash glyphs next to a digit → `-`
//! 4. spaces before the last chōme/banchi marker removed
//! 5. spaces inside a "…郡…町/村" or "…市…区" span removed
//! 6. spaces before the first "digit-" removed

use crate::dictionary::dash_class;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

static DASH: Lazy<Regex> = Lazy::new(|| Regex::new(dash_class()).expect("dash regex"));

static DASH_NEXT_TO_DIGIT: Lazy<Regex> = Lazy::new(|| {
    let dash = dash_class();
    Regex::new(&format!(
        "(?:[0-9０-９一二三四五六七八九〇十百千]{d})|(?:{d}[0-9０-９一二三四五六七八九〇十])",
        d = dash
    ))
    .expect("dash next to digit regex")
});

static UP_TO_CHOME_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new("(.+)(丁目?|番[町地丁]|条|軒|線|[のノ]町|地割)").expect("chome span regex")
});

static CITY_WARD_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("(.+)((郡.+(町|村))|((市|巿).+(区|區)))").expect("city ward span regex")
});

static UP_TO_FIRST_NUMBER_DASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(".+?[0-9一二三四五六七八九〇十百千]-").expect("number dash regex")
});

/// Full-width ASCII letter or digit to half-width
fn to_half_width(c: char) -> char {
    match c {
        '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}

/// Fold full-width letters and digits to ASCII
pub fn fold_width(text: &str) -> String {
    text.chars().map(to_half_width).collect()
}

/// Remove spaces inside the first match of `re`
fn remove_spaces_in_first(re: &Regex, text: &str) -> String {
    match re.find(text) {
        Some(m) => format!(
            "{}{}{}",
            &text[..m.start()],
            m.as_str().replace(' ', ""),
            &text[m.end()..]
        ),
        None => text.to_string(),
    }
}

/// Canonicalize a raw address
pub fn preprocess(address: &str) -> String {
    let text = WHITESPACE.replace_all(address.trim(), " ");
    let text = fold_width(&text);
    let text = DASH_NEXT_TO_DIGIT
        .replace_all(&text, |caps: &regex::Captures| DASH.replace_all(&caps[0], "-").into_owned())
        .into_owned();
    let text = remove_spaces_in_first(&UP_TO_CHOME_MARKER, &text);
    let text = remove_spaces_in_first(&CITY_WARD_SPAN, &text);
    remove_spaces_in_first(&UP_TO_FIRST_NUMBER_DASH, &text)
}
