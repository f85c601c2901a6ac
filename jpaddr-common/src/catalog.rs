//! Reference catalog read interface
//!
//! The resolution engine reads administrative names through
//! [`ReferenceCatalog`] only. How the data is fetched, cached or retried is the
//! implementor's business; the engine treats every call as eventually
//! returning a (possibly empty) table.

use crate::types::{PrefectureTable, TownRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only access to prefecture/city/town tables
#[async_trait]
pub trait ReferenceCatalog: Send + Sync {
    /// Prefecture → cities table
    async fn prefecture_table(&self) -> Arc<PrefectureTable>;

    /// Towns of one (prefecture, city) pair; empty when unknown
    async fn towns(&self, prefecture: &str, city: &str) -> Arc<Vec<TownRecord>>;
}

#[async_trait]
impl<T: ReferenceCatalog + ?Sized> ReferenceCatalog for Arc<T> {
    async fn prefecture_table(&self) -> Arc<PrefectureTable> {
        (**self).prefecture_table().await
    }

    async fn towns(&self, prefecture: &str, city: &str) -> Arc<Vec<TownRecord>> {
        (**self).towns(prefecture, city).await
    }
}

/// Catalog held entirely in memory
///
/// Used for offline resolution and as the test fixture for the engine.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    prefectures: Arc<PrefectureTable>,
    towns: HashMap<(String, String), Arc<Vec<TownRecord>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a city and its towns, appending the city to its prefecture
    pub fn with_city(mut self, prefecture: &str, city: &str, towns: Vec<TownRecord>) -> Self {
        let table = Arc::make_mut(&mut self.prefectures);
        let mut cities = table.cities(prefecture).map(<[String]>::to_vec).unwrap_or_default();
        if !cities.iter().any(|c| c == city) {
            cities.push(city.to_string());
        }
        table.insert(prefecture, cities);
        self.towns
            .insert((prefecture.to_string(), city.to_string()), Arc::new(towns));
        self
    }

    /// Register a prefecture with no cities (keeps catalog order for patterns)
    pub fn with_prefecture(mut self, prefecture: &str) -> Self {
        let table = Arc::make_mut(&mut self.prefectures);
        if table.cities(prefecture).is_none() {
            table.insert(prefecture, Vec::new());
        }
        self
    }
}

#[async_trait]
impl ReferenceCatalog for InMemoryCatalog {
    async fn prefecture_table(&self) -> Arc<PrefectureTable> {
        Arc::clone(&self.prefectures)
    }

    async fn towns(&self, prefecture: &str, city: &str) -> Arc<Vec<TownRecord>> {
        self.towns
            .get(&(prefecture.to_string(), city.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_catalog_lookup() {
        let catalog = InMemoryCatalog::new()
            .with_prefecture("北海道")
            .with_city("和歌山県", "和歌山市", vec![TownRecord::new("七番丁", None, None)])
            .with_city("和歌山県", "東牟婁郡串本町", vec![TownRecord::new("串本", Some(33.47), Some(135.78))]);

        let table = catalog.prefecture_table().await;
        let prefs: Vec<&str> = table.prefectures().collect();
        assert_eq!(prefs, vec!["北海道", "和歌山県"]);
        assert_eq!(table.cities("和歌山県").unwrap().len(), 2);

        let towns = catalog.towns("和歌山県", "東牟婁郡串本町").await;
        assert_eq!(towns[0].town, "串本");

        // Town records are scoped to their own (prefecture, city) pair
        assert!(catalog.towns("北海道", "東牟婁郡串本町").await.is_empty());
    }
}
