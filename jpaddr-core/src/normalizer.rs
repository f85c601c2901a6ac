//! Address resolution entry point
//!
//! [`Normalizer::resolve`] runs preprocessing, the prefecture → city → town
//! stages, block-number canonicalization and the patch table, reading
//! catalog data through [`ReferenceCatalog`]. Catalog reads are the only
//! suspension points; everything else is plain computation.

use crate::matcher::{all_matches, apply_town, first_match, match_town, ParseState};
use crate::patches::patch;
use crate::patterns::PatternCache;
use crate::postprocess::postprocess;
use crate::preprocess::preprocess;
use jpaddr_common::{PrefectureTable, ReferenceCatalog, ResolutionResult, ResolveLevel};
use std::sync::Arc;
use tracing::debug;

/// City hit found while the prefecture is still unknown
#[derive(Debug)]
struct CityCandidate<'t> {
    prefecture: &'t str,
    city: String,
    rest: String,
}

/// Resolves free-form addresses against a reference catalog
pub struct Normalizer<C> {
    catalog: C,
    patterns: Arc<PatternCache>,
}

impl<C: ReferenceCatalog> Normalizer<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_pattern_cache(catalog, Arc::new(PatternCache::new()))
    }

    /// Share a compiled-pattern cache between several normalizers
    pub fn with_pattern_cache(catalog: C, patterns: Arc<PatternCache>) -> Self {
        Self { catalog, patterns }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn pattern_cache(&self) -> &Arc<PatternCache> {
        &self.patterns
    }

    /// Resolve one address, running at most `level` stages
    ///
    /// Never fails: unmatched stages leave their field empty and lower the
    /// result level.
    pub async fn resolve(&self, address: &str, level: ResolveLevel) -> ResolutionResult {
        let mut state = ParseState::new(preprocess(address));
        let table = self.catalog.prefecture_table().await;

        self.prefecture_stage(&mut state, &table).await;

        if !state.prefecture.is_empty() && level >= ResolveLevel::City {
            self.city_stage(&mut state, &table);
        }

        if !state.city.is_empty() && level >= ResolveLevel::Town {
            self.town_stage(&mut state).await;
        }

        state.remaining = patch(&state.prefecture, &state.city, &state.town, &state.remaining);

        debug!(
            input = %address,
            requested = %level,
            matched = state.matched_level(),
            "Resolved address"
        );
        state.into_result()
    }

    async fn prefecture_stage(&self, state: &mut ParseState, table: &PrefectureTable) {
        let names: Vec<String> = table.prefectures().map(String::from).collect();

        if let Some(found) = first_match(&self.patterns.prefectures(&names, false), &state.remaining) {
            debug!(prefecture = %found.name, "Prefecture matched");
            state.prefecture = found.name;
            state.remaining = found.rest;
            return;
        }

        // Prefecture omitted: infer it from the city
        if let Some(prefecture) = self.infer_prefecture(&state.remaining, table).await {
            debug!(prefecture = %prefecture, "Prefecture inferred from city");
            state.prefecture = prefecture;
            return;
        }

        if let Some(found) = first_match(&self.patterns.prefectures(&names, true), &state.remaining) {
            debug!(prefecture = %found.name, "Prefecture matched without suffix");
            state.prefecture = found.name;
            state.remaining = found.rest;
        }
    }

    /// Prefecture owning the only city that matches, or, when several do,
    /// the first whose town stage also succeeds
    async fn infer_prefecture(&self, text: &str, table: &PrefectureTable) -> Option<String> {
        let mut candidates: Vec<CityCandidate<'_>> = Vec::new();
        for (prefecture, cities) in table.iter() {
            for found in all_matches(&self.patterns.cities(cities), text) {
                candidates.push(CityCandidate {
                    prefecture,
                    city: found.name,
                    rest: found.rest,
                });
            }
        }

        match candidates.as_slice() {
            [] => None,
            [only] => Some(only.prefecture.to_string()),
            _ => {
                debug!(candidates = candidates.len(), "Ambiguous city, trying towns");
                for candidate in &candidates {
                    let towns = self.catalog.towns(candidate.prefecture, &candidate.city).await;
                    let patterns = self.patterns.towns(&candidate.city, &towns);
                    if match_town(&candidate.rest, &patterns).is_some() {
                        return Some(candidate.prefecture.to_string());
                    }
                }
                None
            }
        }
    }

    fn city_stage(&self, state: &mut ParseState, table: &PrefectureTable) {
        let Some(cities) = table.cities(&state.prefecture) else {
            return;
        };

        if let Some(found) = first_match(&self.patterns.cities(cities), &state.remaining) {
            debug!(city = %found.name, "City matched");
            state.city = found.name;
            state.remaining = found.rest;
        }
    }

    async fn town_stage(&self, state: &mut ParseState) {
        let towns = self.catalog.towns(&state.prefecture, &state.city).await;
        let patterns = self.patterns.towns(&state.city, &towns);

        let remaining = state.remaining.trim();
        state.remaining = remaining.strip_prefix("大字").unwrap_or(remaining).to_string();

        if let Some(found) = match_town(&state.remaining, &patterns) {
            debug!(town = %found.name, "Town matched");
            apply_town(state, found, &towns);
        }

        state.remaining = postprocess(&state.remaining);
    }
}
