//! Japanese numeral engine
//!
//! Converts between kanji numeral notation and integers:
//! - [`find_numeral_spans`] locates maximal numeral runs in free text
//! - [`numeral_span_to_integer`] evaluates one run (positional digits or
//!   place-value notation with 十/百/千 and 万/億/兆)
//! - [`convert_numerals`] rewrites every run in a text to decimal digits
//! - [`integer_to_kanji`] renders an integer in place-value kanji
//!
//! Legacy glyphs (壱, 弐, 拾, 萬, ...) are recognised by the span grammar and
//! folded to their modern forms before evaluation.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

/// A numeral run that does not evaluate to an integer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a Japanese integer numeral: {span:?}")]
pub struct NumeralFormatError {
    pub span: String,
}

impl NumeralFormatError {
    fn new(span: &str) -> Self {
        Self {
            span: span.to_string(),
        }
    }
}

/// Large units, descending magnitude
const LARGE_UNITS: [(char, u64); 3] = [
    ('兆', 1_000_000_000_000),
    ('億', 100_000_000),
    ('万', 10_000),
];

/// Small units, descending magnitude
const SMALL_UNITS: [(char, u64); 3] = [('千', 1000), ('百', 100), ('十', 10)];

/// Legacy glyph → modern glyph(s)
const LEGACY_NUMERALS: [(char, &str); 22] = [
    ('零', "〇"),
    ('壱', "一"),
    ('壹', "一"),
    ('弐', "二"),
    ('弍', "二"),
    ('貳', "二"),
    ('貮', "二"),
    ('参', "三"),
    ('參', "三"),
    ('肆', "四"),
    ('伍', "五"),
    ('陸', "六"),
    ('漆', "七"),
    ('捌', "八"),
    ('玖', "九"),
    ('拾', "十"),
    ('廿', "二十"),
    ('陌', "百"),
    ('佰', "百"),
    ('阡', "千"),
    ('仟', "千"),
    ('萬', "万"),
];

const KANJI_DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Maximal-run grammar: `(千)?(百)?(十)?(digits)?` nested under 兆/億/万
static NUMERAL_SPAN: Lazy<Regex> = Lazy::new(|| {
    let digits = "[0-9０-９〇一二三四五六七八九零壱壹弐弍貳貮参參肆伍陸漆捌玖廿]";
    let base = format!(
        "(?:{d}*(?:千|阡|仟))?(?:{d}*(?:百|陌|佰))?(?:{d}*(?:十|拾))?(?:{d}+)?",
        d = digits
    );
    let pattern = format!("(?:{b}兆)?(?:{b}億)?(?:{b}(?:万|萬))?{b}", b = base);
    Regex::new(&pattern).expect("numeral span regex")
});

/// Value of a single digit glyph (Arabic, full-width or kanji)
fn digit_value(c: char) -> Option<u64> {
    match c {
        '0'..='9' => Some(c as u64 - '0' as u64),
        '０'..='９' => Some(c as u64 - '０' as u64),
        _ => KANJI_DIGITS.iter().position(|&k| k == c).map(|i| i as u64),
    }
}

/// Fold legacy numeral glyphs to modern ones
pub fn fold_legacy_numerals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match LEGACY_NUMERALS.iter().find(|(legacy, _)| *legacy == c) {
            Some((_, modern)) => out.push_str(modern),
            None => out.push(c),
        }
    }
    out
}

/// Byte ranges of numeral runs in `text`
///
/// Contiguous grammar matches are merged into one run. Runs made only of
/// Arabic digits, and lone 万/億/兆, are not reported.
pub fn numeral_span_ranges(text: &str) -> Vec<Range<usize>> {
    let mut merged: Vec<Range<usize>> = Vec::new();
    for m in NUMERAL_SPAN.find_iter(text) {
        if m.start() == m.end() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.end == m.start() => last.end = m.end(),
            _ => merged.push(m.range()),
        }
    }

    merged
        .into_iter()
        .filter(|range| {
            let span = &text[range.clone()];
            !matches!(span, "兆" | "億" | "万" | "萬")
                && !span.chars().all(|c| c.is_ascii_digit() || ('０'..='９').contains(&c))
        })
        .collect()
}

/// Numeral runs in `text`, in order of appearance
pub fn find_numeral_spans(text: &str) -> Vec<&str> {
    numeral_span_ranges(text)
        .into_iter()
        .map(|range| &text[range])
        .collect()
}

/// Evaluate one numeral run
///
/// A run made only of digit glyphs is read positionally (`一二三四` = 1234).
/// Otherwise the run is split on 兆/億/万, each head evaluated recursively and
/// scaled; the residue is split the same way on 千/百/十.
pub fn numeral_span_to_integer(span: &str) -> Result<u64, NumeralFormatError> {
    let folded = fold_legacy_numerals(span);
    if folded.is_empty() {
        return Err(NumeralFormatError::new(span));
    }
    evaluate(&folded).map_err(|_| NumeralFormatError::new(span))
}

fn evaluate(text: &str) -> Result<u64, NumeralFormatError> {
    if text.chars().all(|c| digit_value(c).is_some()) {
        return positional(text);
    }

    let mut rest = text;
    let mut total: u64 = 0;
    for (unit, magnitude) in LARGE_UNITS {
        // Greedy head: everything up to the last occurrence of the unit
        if let Some(pos) = rest.rfind(unit) {
            let head = &rest[..pos];
            if head.is_empty() {
                return Err(NumeralFormatError::new(text));
            }
            let value = evaluate(head)?;
            total = value
                .checked_mul(magnitude)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(|| NumeralFormatError::new(text))?;
            rest = &rest[pos + unit.len_utf8()..];
        }
    }

    let below_man = small_units(rest)?;
    total
        .checked_add(below_man)
        .ok_or_else(|| NumeralFormatError::new(text))
}

/// Value below 10,000 written with 千/百/十
fn small_units(text: &str) -> Result<u64, NumeralFormatError> {
    let mut rest = text;
    let mut total: u64 = 0;
    for (unit, magnitude) in SMALL_UNITS {
        if let Some(pos) = rest.rfind(unit) {
            let head = &rest[..pos];
            // 十 alone means one ten
            let multiplier = if head.is_empty() { 1 } else { positional(head)? };
            total = multiplier
                .checked_mul(magnitude)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(|| NumeralFormatError::new(text))?;
            rest = &rest[pos + unit.len_utf8()..];
        }
    }

    if !rest.is_empty() {
        total = total
            .checked_add(positional(rest)?)
            .ok_or_else(|| NumeralFormatError::new(text))?;
    }
    Ok(total)
}

/// Digits read left to right
fn positional(text: &str) -> Result<u64, NumeralFormatError> {
    let mut value: u64 = 0;
    for c in text.chars() {
        let digit = digit_value(c).ok_or_else(|| NumeralFormatError::new(text))?;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| NumeralFormatError::new(text))?;
    }
    Ok(value)
}

/// Replace every numeral run in `text` with its decimal value
///
/// Runs that fail to evaluate are left as written.
pub fn convert_numerals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in numeral_span_ranges(text) {
        let span = &text[range.clone()];
        out.push_str(&text[cursor..range.start]);
        match numeral_span_to_integer(span) {
            Ok(value) => out.push_str(&value.to_string()),
            Err(e) => {
                debug!(span = %span, error = %e, "Leaving numeral span unconverted");
                out.push_str(span);
            }
        }
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Render an integer in place-value kanji (`1234` → `千二百三十四`)
pub fn integer_to_kanji(value: u64) -> String {
    if value == 0 {
        return KANJI_DIGITS[0].to_string();
    }

    let mut rest = value;
    let mut kanji = String::new();
    for (unit, magnitude) in LARGE_UNITS {
        let n = rest / magnitude;
        if n > 0 {
            rest -= n * magnitude;
            // Only the 兆 multiplier can reach 万 or more
            if n >= 10_000 {
                kanji.push_str(&integer_to_kanji(n));
            } else {
                kanji.push_str(&below_man_to_kanji(n));
            }
            kanji.push(unit);
        }
    }
    if rest > 0 {
        kanji.push_str(&below_man_to_kanji(rest));
    }
    kanji
}

fn below_man_to_kanji(value: u64) -> String {
    let mut rest = value;
    let mut kanji = String::new();
    for (unit, magnitude) in SMALL_UNITS {
        let n = rest / magnitude;
        if n > 0 {
            rest -= n * magnitude;
            if n > 1 {
                kanji.push(KANJI_DIGITS[n as usize]);
            }
            kanji.push(unit);
        }
    }
    if rest > 0 {
        kanji.push(KANJI_DIGITS[rest as usize]);
    }
    kanji
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_value_numerals() {
        assert_eq!(numeral_span_to_integer("千二百三十四").unwrap(), 1234);
        assert_eq!(numeral_span_to_integer("一千二百三十四").unwrap(), 1234);
        assert_eq!(numeral_span_to_integer("五百三十七").unwrap(), 537);
        assert_eq!(numeral_span_to_integer("二十四").unwrap(), 24);
        assert_eq!(numeral_span_to_integer("十").unwrap(), 10);
        assert_eq!(numeral_span_to_integer("二千二十").unwrap(), 2020);
    }

    #[test]
    fn test_positional_digits() {
        assert_eq!(numeral_span_to_integer("一二三四").unwrap(), 1234);
        assert_eq!(numeral_span_to_integer("二〇二〇").unwrap(), 2020);
        assert_eq!(numeral_span_to_integer("３０9").unwrap(), 309);
    }

    #[test]
    fn test_stray_digits_outside_units_are_positional() {
        assert_eq!(numeral_span_to_integer("二千〇五").unwrap(), 2005);
    }

    #[test]
    fn test_large_units() {
        assert_eq!(numeral_span_to_integer("一万").unwrap(), 10_000);
        assert_eq!(numeral_span_to_integer("三億五千万").unwrap(), 350_000_000);
        assert_eq!(
            numeral_span_to_integer("千百十一兆千百十一億千百十一万千百十一").unwrap(),
            1_111_111_111_111_111
        );
    }

    #[test]
    fn test_legacy_glyphs() {
        assert_eq!(numeral_span_to_integer("壱").unwrap(), 1);
        assert_eq!(numeral_span_to_integer("弐拾参").unwrap(), 23);
        assert_eq!(numeral_span_to_integer("廿一").unwrap(), 21);
        assert_eq!(numeral_span_to_integer("壱萬").unwrap(), 10_000);
    }

    #[test]
    fn test_malformed_numerals_fail() {
        assert!(numeral_span_to_integer("").is_err());
        assert!(numeral_span_to_integer("万一").is_err());
        assert!(numeral_span_to_integer("十一十二").is_err());
        assert!(numeral_span_to_integer("一二三四五六七八九〇一二三四五六七八九〇一").is_err());
    }

    #[test]
    fn test_find_numeral_spans() {
        assert_eq!(find_numeral_spans("千二百三十四"), vec!["千二百三十四"]);
        assert_eq!(find_numeral_spans("五百三十七の1"), vec!["五百三十七"]);
        assert_eq!(find_numeral_spans("十四-イ二十二"), vec!["十四", "二十二"]);
        assert!(find_numeral_spans("あいうえお").is_empty());
        assert!(find_numeral_spans("万").is_empty());
        assert!(find_numeral_spans("123").is_empty());
    }

    #[test]
    fn test_contiguous_matches_merge() {
        assert_eq!(find_numeral_spans("十一十二"), vec!["十一十二"]);
    }

    #[test]
    fn test_convert_numerals() {
        assert_eq!(convert_numerals("千二百三十四"), "1234");
        assert_eq!(convert_numerals("五百三十七の1"), "537の1");
        assert_eq!(convert_numerals("五百三十七-1"), "537-1");
        assert_eq!(convert_numerals("-イ二十二"), "-イ22");
    }

    #[test]
    fn test_convert_leaves_malformed_span_untouched() {
        assert_eq!(convert_numerals("万一の場合"), "万一の場合");
        assert_eq!(convert_numerals("十一十二番"), "十一十二番");
    }

    #[test]
    fn test_convert_is_idempotent() {
        for text in ["千二百三十四", "亥四十五番地一", "十一十二番", "北二十四条西六丁目", "一四-A二二 ビル"] {
            let once = convert_numerals(text);
            assert_eq!(convert_numerals(&once), once, "input {}", text);
        }
    }

    #[test]
    fn test_integer_to_kanji() {
        assert_eq!(integer_to_kanji(0), "〇");
        assert_eq!(integer_to_kanji(1), "一");
        assert_eq!(integer_to_kanji(10), "十");
        assert_eq!(integer_to_kanji(111), "百十一");
        assert_eq!(integer_to_kanji(2020), "二千二十");
        assert_eq!(integer_to_kanji(1234), "千二百三十四");
        assert_eq!(integer_to_kanji(10_000), "一万");
        assert_eq!(integer_to_kanji(10_000_000_000_000_000), "一万兆");
        assert_eq!(integer_to_kanji(123_400_000_000_000_000), "十二万三千四百兆");
    }

    #[test]
    fn test_trillion_multiplier_above_ten_thousand() {
        let rendered = integer_to_kanji(u64::MAX);
        assert_eq!(rendered, "千八百四十四万六千七百四十四兆七百三十七億九百五十五万千六百十五");
        assert_eq!(numeral_span_to_integer(&rendered).unwrap(), u64::MAX);
        assert_eq!(numeral_span_to_integer("一万兆").unwrap(), 10_000_000_000_000_000);
    }

    #[test]
    fn test_kanji_round_trip() {
        for n in [1u64, 10, 111, 2020, 1234, 10_001, 350_000_000, 1_111_111_111_111_111] {
            assert_eq!(numeral_span_to_integer(&integer_to_kanji(n)).unwrap(), n);
        }
    }
}
