//! # jpaddr Common Library
//!
//! Shared code for all jpaddr crates including:
//! - Catalog record types and the resolution result
//! - The reference catalog read interface
//! - Configuration loading
//! - Common error type

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::{InMemoryCatalog, ReferenceCatalog};
pub use error::{Error, Result};
pub use types::{PrefectureTable, ResolutionResult, ResolveLevel, TownRecord};
