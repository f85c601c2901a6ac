//! Catalog document retrieval
//!
//! [`CatalogFetcher`] is the seam between the TTL cache and the transport.
//! [`SourceFetcher`] reads remote sources over HTTP and local sources from
//! disk, then decodes the JSON documents.

use crate::source::{CatalogSource, Location};
use crate::FetchError;
use async_trait::async_trait;
use jpaddr_common::{PrefectureTable, TownRecord};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("jpaddr/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout for remote sources
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Uncached access to catalog documents
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch_prefecture_table(&self, source: &CatalogSource) -> Result<PrefectureTable, FetchError>;

    async fn fetch_towns(
        &self,
        source: &CatalogSource,
        prefecture: &str,
        city: &str,
    ) -> Result<Vec<TownRecord>, FetchError>;
}

/// Fetcher for HTTP(S) and local-directory sources
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    http_client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }

    async fn fetch_bytes(&self, location: &Location) -> Result<Vec<u8>, FetchError> {
        match location {
            Location::Url(url) => {
                tracing::debug!(url = %url, "Fetching catalog document");

                let response = self
                    .http_client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| FetchError::Network(e.to_string()))?;

                let status = response.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(FetchError::NotFound(url.to_string()));
                }
                if !status.is_success() {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(FetchError::Http(status.as_u16(), error_text));
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::Network(e.to_string()))?;
                Ok(body.to_vec())
            }
            Location::Path(path) => {
                tracing::debug!(path = %path.display(), "Reading catalog document");

                tokio::fs::read(path).await.map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
                    _ => FetchError::Io(e),
                })
            }
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, location: &Location) -> Result<T, FetchError> {
        let bytes = self.fetch_bytes(location).await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Parse(format!("{}: {}", location, e)))
    }
}

#[async_trait]
impl CatalogFetcher for SourceFetcher {
    async fn fetch_prefecture_table(&self, source: &CatalogSource) -> Result<PrefectureTable, FetchError> {
        let location = source.prefecture_table()?;
        let table: PrefectureTable = self.fetch_json(&location).await?;
        tracing::debug!(source = %source, prefectures = table.len(), "Loaded prefecture table");
        Ok(table)
    }

    async fn fetch_towns(
        &self,
        source: &CatalogSource,
        prefecture: &str,
        city: &str,
    ) -> Result<Vec<TownRecord>, FetchError> {
        let location = source.towns(prefecture, city)?;
        let towns: Vec<TownRecord> = self.fetch_json(&location).await?;
        tracing::debug!(
            prefecture = %prefecture,
            city = %city,
            towns = towns.len(),
            "Loaded town list"
        );
        Ok(towns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        assert!(SourceFetcher::new().is_ok());
        assert!(SourceFetcher::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_missing_local_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = CatalogSource::Local(dir.path().join("api").join("ja"));
        let fetcher = SourceFetcher::new().unwrap();

        let result = fetcher.fetch_towns(&source, "東京都", "文京区").await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_malformed_local_document_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("ja");
        std::fs::write(dir.path().join("ja.json"), "{not json").unwrap();

        let fetcher = SourceFetcher::new().unwrap();
        let result = fetcher.fetch_prefecture_table(&CatalogSource::Local(base)).await;
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }
}
