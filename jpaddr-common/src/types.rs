//! Shared data model: catalog records, resolution level and result
//!
//! These types cross crate boundaries: `jpaddr-catalog` produces
//! [`PrefectureTable`] and [`TownRecord`], `jpaddr-core` consumes them and
//! produces [`ResolutionResult`].

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// How far a resolution call is allowed to go
///
/// Stages beyond the requested level are skipped and their fields left
/// empty; earlier stages always run in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ResolveLevel {
    /// Prefecture only
    Prefecture = 1,
    /// Prefecture and city
    City = 2,
    /// Prefecture, city and town (default)
    #[default]
    Town = 3,
}

impl ResolveLevel {
    /// Numeric value (1, 2 or 3)
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ResolveLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ResolveLevel::Prefecture),
            2 => Ok(ResolveLevel::City),
            3 => Ok(ResolveLevel::Town),
            other => Err(Error::InvalidInput(format!(
                "resolution level must be 1, 2 or 3 (got {})",
                other
            ))),
        }
    }
}

impl fmt::Display for ResolveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Prefecture → ordered city names, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefectureTable(IndexMap<String, Vec<String>>);

impl PrefectureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a prefecture with its cities (replaces an existing entry in place)
    pub fn insert(&mut self, prefecture: impl Into<String>, cities: Vec<String>) {
        self.0.insert(prefecture.into(), cities);
    }

    /// Prefecture names in catalog order
    pub fn prefectures(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Cities of one prefecture, in catalog order
    pub fn cities(&self, prefecture: &str) -> Option<&[String]> {
        self.0.get(prefecture).map(Vec::as_slice)
    }

    /// (prefecture, cities) pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for PrefectureTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One town entry of a (prefecture, city) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownRecord {
    /// Town (chōme-level) name as written in the catalog
    pub town: String,
    /// Small-section name; carried through, not used for matching
    #[serde(default)]
    pub koaza: String,
    /// Latitude of the town's representative point
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
    /// Longitude of the town's representative point
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lng: Option<f64>,
}

impl TownRecord {
    pub fn new(town: impl Into<String>, lat: Option<f64>, lng: Option<f64>) -> Self {
        Self {
            town: town.into(),
            koaza: String::new(),
            lat,
            lng,
        }
    }
}

/// Accepts a number, a numeric string or null; anything else becomes `None`
fn lenient_coordinate<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    let value = Option::<Raw>::deserialize(deserializer)?;
    Ok(match value {
        Some(Raw::Number(n)) if n.is_finite() => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

/// Final output of one resolution call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub pref: String,
    pub city: String,
    pub town: String,
    /// Unmatched remainder in canonical block-number form
    pub addr: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Number of non-empty fields among pref, city and town
    pub level: u8,
}

impl ResolutionResult {
    /// Build a result; `level` is always derived from the three name fields
    pub fn new(
        pref: String,
        city: String,
        town: String,
        addr: String,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Self {
        let level = [&pref, &city, &town]
            .iter()
            .filter(|field| !field.is_empty())
            .count() as u8;
        Self {
            pref,
            city,
            town,
            addr,
            lat,
            lng,
            level,
        }
    }
}
