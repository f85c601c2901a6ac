//! Variant pattern construction for prefecture, city and town names
//!
//! Every builder is a pure function of its name list, so compiled pattern
//! lists are shared through [`PatternCache`].

use crate::dictionary::{dash_class, literal_pattern};
use crate::numerals::numeral_span_to_integer;
use jpaddr_common::TownRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Kanji numeral run followed by a chōme-style marker
static CHOME_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new("([壱一二三四五六七八九十]+)(丁目?|番(?:町|丁)|条|軒|線|(?:の|ノ)町|地割|号)")
        .expect("chome marker regex")
});

/// Kanji numeral run followed by 丁/丁目, with a non-numeral before it
static BARE_CHOME: Lazy<Regex> = Lazy::new(|| {
    Regex::new("[^一二三四五六七八九十]([一二三四五六七八九十]+)丁目?").expect("bare chome regex")
});

/// Kanji numeral directly before 町, anywhere in a town name
static NUMERAL_CHO: Lazy<Regex> =
    Lazy::new(|| Regex::new("[壱一二三四五六七八九十]町").expect("numeral cho regex"));

static AZA_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new("大?字").expect("aza regex"));

/// Prefix of a Kyoto city-ward name (towns there need find-anywhere matching)
pub const KYOTO_CITY_PREFIX: &str = "京都市";

const PREFECTURE_SUFFIXES: [char; 4] = ['都', '道', '府', '県'];

/// A compiled name pattern
#[derive(Debug, Clone)]
pub struct VariantPattern {
    /// Name reported when this pattern matches
    pub name: String,
    /// Index of the source record in the list the pattern was built from
    pub index: usize,
    pub regex: Regex,
}

impl VariantPattern {
    /// Byte length of the prefix of `text` consumed by this pattern
    pub fn consumed(&self, text: &str) -> Option<usize> {
        self.regex.find(text).map(|m| m.end())
    }
}

fn compile(name: &str, index: usize, pattern: &str) -> Option<VariantPattern> {
    match Regex::new(pattern) {
        Ok(regex) => Some(VariantPattern {
            name: name.to_string(),
            index,
            regex,
        }),
        Err(e) => {
            warn!(name = %name, error = %e, "Skipping name with uncompilable pattern");
            None
        }
    }
}

/// Prefecture patterns in catalog order
///
/// The 都/道/府/県 suffix is required unless `suffix_optional` is set.
pub fn prefecture_patterns(prefectures: &[String], suffix_optional: bool) -> Vec<VariantPattern> {
    let suffix = if suffix_optional {
        "(?:都|道|府|県)?"
    } else {
        "(?:都|道|府|県)"
    };

    prefectures
        .iter()
        .enumerate()
        .filter_map(|(index, pref)| {
            let stem = pref.strip_suffix(&PREFECTURE_SUFFIXES[..]).unwrap_or(pref);
            compile(pref, index, &format!("^{}{}", literal_pattern(stem), suffix))
        })
        .collect()
}

/// City patterns, shortest name first
///
/// A leading "…郡" district qualifier is optional for towns and villages.
pub fn city_patterns(cities: &[String]) -> Vec<VariantPattern> {
    let mut ordered: Vec<(usize, &String)> = cities.iter().enumerate().collect();
    ordered.sort_by_key(|(_, city)| city.chars().count());

    ordered
        .into_iter()
        .filter_map(|(index, city)| compile(city, index, &format!("^{}", city_body(city))))
        .collect()
}

fn city_body(city: &str) -> String {
    if city.ends_with('町') || city.ends_with('村') {
        if let Some(pos) = city.find('郡').filter(|&pos| pos > 0) {
            let (district, rest) = city.split_at(pos + '郡'.len_utf8());
            return format!("(?:{})?{}", literal_pattern(district), literal_pattern(rest));
        }
    }
    literal_pattern(city)
}

/// A town candidate before compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TownCandidate {
    /// Name the pattern is built from
    pub pattern_name: String,
    /// Name reported on a match (the catalog name for derived aliases)
    pub reported_name: String,
    pub index: usize,
}

fn is_kanji_numeral_followed_by_cho(town: &str) -> bool {
    NUMERAL_CHO.is_match(town)
}

/// Town name with every non-leading 町 removed
fn without_cho(town: &str) -> String {
    let mut chars = town.chars();
    let mut alias = String::with_capacity(town.len());
    if let Some(first) = chars.next() {
        alias.push(first);
    }
    alias.extend(chars.filter(|&c| c != '町'));
    alias
}

/// Catalog towns plus derived 町-less aliases, most specific first
pub fn town_candidates(city: &str, towns: &[TownRecord]) -> Vec<TownCandidate> {
    let mut candidates: Vec<TownCandidate> = towns
        .iter()
        .enumerate()
        .map(|(index, record)| TownCandidate {
            pattern_name: record.town.clone(),
            reported_name: record.town.clone(),
            index,
        })
        .collect();

    if !city.starts_with(KYOTO_CITY_PREFIX) {
        let known: HashSet<&str> = towns.iter().map(|t| t.town.as_str()).collect();
        for (index, record) in towns.iter().enumerate() {
            let alias = without_cho(&record.town);
            if alias == record.town
                || known.contains(alias.as_str())
                || known.contains(format!("大字{}", alias).as_str())
                || is_kanji_numeral_followed_by_cho(&record.town)
            {
                continue;
            }
            candidates.push(TownCandidate {
                pattern_name: alias,
                reported_name: record.town.clone(),
                index,
            });
        }
    }

    // 大字 does not count toward specificity
    candidates.sort_by_key(|c| {
        let len = c.pattern_name.chars().count();
        let effective = if c.pattern_name.starts_with("大字") {
            len - 2
        } else {
            len
        };
        std::cmp::Reverse(effective)
    });
    candidates
}

/// Numeral alternatives for a chōme numeral run
fn chome_numeral(numeral: &str) -> String {
    let mut alternatives = vec![literal_pattern(numeral)];
    if numeral.starts_with('壱') {
        alternatives.extend(["一", "1", "１"].iter().map(|s| s.to_string()));
    } else if let Ok(value) = numeral_span_to_integer(numeral) {
        alternatives.push(value.to_string());
    }
    format!("(?:{})", alternatives.join("|"))
}

fn chome_marker() -> String {
    format!(
        "(?:(?:丁|町)目?|番(?:町|丁)|条|軒|線|の町?|地割|号|{})",
        dash_class()
    )
}

/// Literal text with optional 大字/字 prefixes
fn aza_optional(text: &str) -> String {
    let mut pattern = String::new();
    let mut cursor = 0;
    for m in AZA_PREFIX.find_iter(text) {
        pattern.push_str(&literal_pattern(&text[cursor..m.start()]));
        pattern.push_str("(?:大?字)?");
        cursor = m.end();
    }
    pattern.push_str(&literal_pattern(&text[cursor..]));
    pattern
}

/// Unanchored pattern body for one town name
pub fn town_body(name: &str) -> String {
    let mut pattern = String::new();
    let mut cursor = 0;
    for caps in CHOME_MARKER.captures_iter(name) {
        let (Some(whole), Some(numeral)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        pattern.push_str(&aza_optional(&name[cursor..whole.start()]));
        pattern.push_str(&chome_numeral(numeral.as_str()));
        pattern.push_str(&chome_marker());
        cursor = whole.end();
    }
    pattern.push_str(&aza_optional(&name[cursor..]));
    pattern
}

/// Pattern accepting a chōme town written without its 丁目 marker
fn bare_chome_body(name: &str) -> Option<String> {
    let numeral = BARE_CHOME.captures(name)?.get(1)?;
    let value = numeral_span_to_integer(numeral.as_str()).ok()?;
    Some(format!(
        "{}(?:{}|{})",
        literal_pattern(&name[..numeral.start()]),
        literal_pattern(numeral.as_str()),
        value
    ))
}

/// Town patterns in evaluation order
///
/// Prefix-anchored candidates come first, then the bare-chōme fallbacks.
/// Kyoto city wards get an extra find-anywhere round after those.
pub fn town_patterns(city: &str, towns: &[TownRecord]) -> Vec<VariantPattern> {
    let candidates = town_candidates(city, towns);
    let bodies: Vec<(&TownCandidate, String)> = candidates
        .iter()
        .map(|c| (c, town_body(&c.pattern_name)))
        .collect();

    let mut patterns: Vec<VariantPattern> = bodies
        .iter()
        .filter_map(|(c, body)| compile(&c.reported_name, c.index, &format!("^{}", body)))
        .collect();

    patterns.extend(candidates.iter().filter_map(|c| {
        let body = bare_chome_body(&c.pattern_name)?;
        compile(&c.reported_name, c.index, &format!("^{}", body))
    }));

    if city.starts_with(KYOTO_CITY_PREFIX) {
        patterns.extend(
            bodies
                .iter()
                .filter_map(|(c, body)| compile(&c.reported_name, c.index, &format!("^.*{}", body))),
        );
    }

    debug!(city = %city, towns = towns.len(), patterns = patterns.len(), "Built town patterns");
    patterns
}

/// Administrative level a cached pattern list belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Prefecture { suffix_optional: bool },
    City,
    /// Town patterns also depend on the city (alias and Kyoto rules)
    Town { city: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PatternKey {
    kind: PatternKind,
    names: Vec<String>,
}

/// Compiled pattern lists keyed by (level, name list)
///
/// Safe to share between concurrent resolutions. Two callers racing on the
/// same key may both build the list; the last insert wins and both results
/// are identical.
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: RwLock<HashMap<PatternKey, Arc<Vec<VariantPattern>>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefectures(&self, prefectures: &[String], suffix_optional: bool) -> Arc<Vec<VariantPattern>> {
        self.get_or_build(
            PatternKind::Prefecture { suffix_optional },
            prefectures.to_vec(),
            || prefecture_patterns(prefectures, suffix_optional),
        )
    }

    pub fn cities(&self, cities: &[String]) -> Arc<Vec<VariantPattern>> {
        self.get_or_build(PatternKind::City, cities.to_vec(), || city_patterns(cities))
    }

    pub fn towns(&self, city: &str, towns: &[TownRecord]) -> Arc<Vec<VariantPattern>> {
        let names = towns.iter().map(|t| t.town.clone()).collect();
        self.get_or_build(
            PatternKind::Town {
                city: city.to_string(),
            },
            names,
            || town_patterns(city, towns),
        )
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn get_or_build<F>(&self, kind: PatternKind, names: Vec<String>, build: F) -> Arc<Vec<VariantPattern>>
    where
        F: FnOnce() -> Vec<VariantPattern>,
    {
        let key = PatternKey { kind, names };
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(hit);
        }

        let built = Arc::new(build());
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&built));
        built
    }
}
