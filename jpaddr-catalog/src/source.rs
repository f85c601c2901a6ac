//! Catalog source locator
//!
//! Both remote and local sources share one layout:
//! - `<base>.json` holds the prefecture → cities table
//! - `<base>/<prefecture>/<city>.json` holds the towns of one city

use crate::FetchError;
use reqwest::Url;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// Where catalog documents are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// `http://` or `https://` base URL
    Remote(Url),
    /// Base path on the local filesystem (plain path or `file://` URL)
    Local(PathBuf),
}

/// Location of one catalog document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Url(Url),
    Path(PathBuf),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Url(url) => write!(f, "{}", url),
            Location::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl CatalogSource {
    /// Parse an endpoint string
    pub fn parse(endpoint: &str) -> Result<Self, FetchError> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(FetchError::InvalidSource("empty endpoint".to_string()));
        }

        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            let url = Url::parse(endpoint)
                .map_err(|e| FetchError::InvalidSource(format!("{}: {}", endpoint, e)))?;
            return Ok(CatalogSource::Remote(url));
        }

        if endpoint.starts_with("file://") {
            let path = Url::parse(endpoint)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| FetchError::InvalidSource(endpoint.to_string()))?;
            return Ok(CatalogSource::Local(path));
        }

        Ok(CatalogSource::Local(PathBuf::from(endpoint)))
    }

    /// Location of the prefecture table
    pub fn prefecture_table(&self) -> Result<Location, FetchError> {
        match self {
            CatalogSource::Remote(base) => {
                let url = format!("{}.json", base.as_str().trim_end_matches('/'));
                Url::parse(&url)
                    .map(Location::Url)
                    .map_err(|e| FetchError::InvalidSource(format!("{}: {}", url, e)))
            }
            CatalogSource::Local(base) => {
                let mut file: OsString = base.as_os_str().to_os_string();
                file.push(".json");
                Ok(Location::Path(PathBuf::from(file)))
            }
        }
    }

    /// Location of the town list of one city (path segments percent-encoded)
    pub fn towns(&self, prefecture: &str, city: &str) -> Result<Location, FetchError> {
        let file_name = format!("{}.json", city);
        match self {
            CatalogSource::Remote(base) => {
                let mut url = base.clone();
                url.path_segments_mut()
                    .map_err(|_| FetchError::InvalidSource(base.to_string()))?
                    .pop_if_empty()
                    .push(prefecture)
                    .push(&file_name);
                Ok(Location::Url(url))
            }
            CatalogSource::Local(base) => Ok(Location::Path(base.join(prefecture).join(file_name))),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Remote(url) => write!(f, "{}", url),
            CatalogSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_layout() {
        let source = CatalogSource::parse("https://example.com/api/ja/").unwrap();
        assert!(matches!(source, CatalogSource::Remote(_)));
        assert_eq!(
            source.prefecture_table().unwrap().to_string(),
            "https://example.com/api/ja.json"
        );
        assert_eq!(
            source.towns("東京都", "文京区").unwrap().to_string(),
            "https://example.com/api/ja/%E6%9D%B1%E4%BA%AC%E9%83%BD/%E6%96%87%E4%BA%AC%E5%8C%BA.json"
        );
    }

    #[test]
    fn test_local_layout() {
        let source = CatalogSource::parse("/srv/api/ja").unwrap();
        assert_eq!(
            source.prefecture_table().unwrap(),
            Location::Path(PathBuf::from("/srv/api/ja.json"))
        );
        assert_eq!(
            source.towns("東京都", "文京区").unwrap(),
            Location::Path(PathBuf::from("/srv/api/ja/東京都/文京区.json"))
        );
    }

    #[test]
    fn test_file_url_is_local() {
        let source = CatalogSource::parse("file:///srv/api/ja").unwrap();
        assert_eq!(source, CatalogSource::Local(PathBuf::from("/srv/api/ja")));
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        assert!(matches!(CatalogSource::parse("  "), Err(FetchError::InvalidSource(_))));
    }
}
