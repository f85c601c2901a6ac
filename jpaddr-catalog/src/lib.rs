//! # jpaddr Catalog
//!
//! Reference catalog backed by the published address dataset layout, read
//! from an HTTP(S) endpoint or a local directory, with a TTL cache and
//! bounded retry of transient failures.

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod retry;
pub mod source;

pub use cache::CachedCatalog;
pub use error::FetchError;
pub use fetcher::{CatalogFetcher, SourceFetcher};
pub use retry::retry_transient;
pub use source::{CatalogSource, Location};
