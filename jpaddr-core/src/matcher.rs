//! Stage matching over compiled pattern lists
//!
//! Each stage tries its patterns in order and consumes the matched prefix of
//! the remaining text. A stage that finds nothing leaves the state untouched;
//! "not found" is an empty field, never an error.

use crate::patterns::VariantPattern;
use jpaddr_common::{ResolutionResult, TownRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// Leading "N番地M号" phrase followed by more text
static LEADING_BANCHI_GO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9〇一二三四五六七八九十百千]+番地?[0-9〇一二三四五六七八九十百千]+号)\s*(.+)$")
        .expect("leading banchi go regex")
});

/// Accumulator threaded through the three stages of one resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseState {
    pub remaining: String,
    pub prefecture: String,
    pub city: String,
    pub town: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl ParseState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            remaining: text.into(),
            ..Self::default()
        }
    }

    /// Number of resolved name fields so far
    pub fn matched_level(&self) -> u8 {
        [&self.prefecture, &self.city, &self.town]
            .iter()
            .filter(|field| !field.is_empty())
            .count() as u8
    }

    pub fn into_result(self) -> ResolutionResult {
        ResolutionResult::new(
            self.prefecture,
            self.city,
            self.town,
            self.remaining,
            self.lat,
            self.lng,
        )
    }
}

/// A pattern that matched at the start of a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    /// Reported name
    pub name: String,
    /// Index of the source record the pattern was built from
    pub index: usize,
    /// Text after the consumed prefix
    pub rest: String,
}

impl NameMatch {
    fn new(pattern: &VariantPattern, text: &str, end: usize) -> Self {
        Self {
            name: pattern.name.clone(),
            index: pattern.index,
            rest: text[end..].to_string(),
        }
    }
}

/// First pattern (in list order) that matches `text`
pub fn first_match(patterns: &[VariantPattern], text: &str) -> Option<NameMatch> {
    patterns
        .iter()
        .find_map(|p| p.consumed(text).map(|end| NameMatch::new(p, text, end)))
}

/// Every pattern that matches `text`, in list order
pub fn all_matches(patterns: &[VariantPattern], text: &str) -> Vec<NameMatch> {
    patterns
        .iter()
        .filter_map(|p| p.consumed(text).map(|end| NameMatch::new(p, text, end)))
        .collect()
}

/// Town stage on a post-city remainder
///
/// A leading 大字 is dropped. A leading "N番地M号" phrase followed by more
/// text is set aside while the rest is matched, then put back in front of
/// the new remainder.
pub fn match_town(remainder: &str, patterns: &[VariantPattern]) -> Option<NameMatch> {
    let text = remainder.trim();
    let text = text.strip_prefix("大字").unwrap_or(text);

    if let Some(caps) = LEADING_BANCHI_GO.captures(text) {
        if let Some(mut found) = first_match(patterns, &caps[2]) {
            found.rest = format!("{}{}", &caps[1], found.rest);
            return Some(found);
        }
    }

    first_match(patterns, text)
}

/// Record the matched town and its coordinates
pub fn apply_town(state: &mut ParseState, found: NameMatch, towns: &[TownRecord]) {
    if let Some(record) = towns.get(found.index) {
        state.lat = record.lat;
        state.lng = record.lng;
    }
    state.town = found.name;
    state.remaining = found.rest;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{city_patterns, town_patterns};

    fn towns(list: &[&str]) -> Vec<TownRecord> {
        list.iter().map(|t| TownRecord::new(*t, None, None)).collect()
    }

    #[test]
    fn test_level_counts_resolved_fields() {
        let mut state = ParseState::new("x");
        assert_eq!(state.matched_level(), 0);
        state.prefecture = "東京都".to_string();
        state.city = "文京区".to_string();
        assert_eq!(state.matched_level(), 2);
        assert_eq!(state.into_result().level, 2);
    }

    #[test]
    fn test_all_matches_keeps_order() {
        let cities: Vec<String> = ["府中市", "府中町"].iter().map(|s| s.to_string()).collect();
        let patterns = city_patterns(&cities);
        let found = all_matches(&patterns, "府中市是政");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "府中市");
        assert_eq!(found[0].rest, "是政");
    }

    #[test]
    fn test_town_strips_oaza() {
        let patterns = town_patterns("某市", &towns(&["上野"]));
        let found = match_town(" 大字上野12", &patterns).unwrap();
        assert_eq!(found.name, "上野");
        assert_eq!(found.rest, "12");
    }

    #[test]
    fn test_town_sets_aside_leading_banchi_go() {
        let patterns = town_patterns("某市", &towns(&["本郷"]));
        let found = match_town("3番5号本郷", &patterns).unwrap();
        assert_eq!(found.name, "本郷");
        assert_eq!(found.rest, "3番5号");
    }

    #[test]
    fn test_town_not_found() {
        let patterns = town_patterns("某市", &towns(&["上野"]));
        assert!(match_town("下野1", &patterns).is_none());
    }

    #[test]
    fn test_apply_town_reads_coordinates_by_index() {
        let records = vec![
            TownRecord::new("上野", Some(35.0), Some(139.0)),
            TownRecord::new("上野原", Some(35.5), Some(139.5)),
        ];
        let patterns = town_patterns("某市", &records);
        let found = match_town("上野原1", &patterns).unwrap();

        let mut state = ParseState::new("上野原1");
        apply_town(&mut state, found, &records);
        assert_eq!(state.town, "上野原");
        assert_eq!(state.lat, Some(35.5));
        assert_eq!(state.remaining, "1");
    }
}
