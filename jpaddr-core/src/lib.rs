//! # jpaddr Core
//!
//! Japanese address resolution engine:
//! - Kanji numeral parsing and rendering
//! - Variant-tolerant name patterns (old kanji, kana spellings, dash glyphs)
//! - Prefecture → city → town matching with prefecture inference
//! - Block-number canonicalization of the remainder

pub mod dictionary;
pub mod matcher;
pub mod normalizer;
pub mod numerals;
pub mod patches;
pub mod patterns;
pub mod postprocess;
pub mod preprocess;

pub use normalizer::Normalizer;
pub use numerals::{
    convert_numerals, find_numeral_spans, integer_to_kanji, numeral_span_to_integer,
    NumeralFormatError,
};
pub use patterns::PatternCache;
