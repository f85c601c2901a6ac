//! Shared fixtures for jpaddr-cli integration tests

#![allow(dead_code)]

use jpaddr_catalog::{CachedCatalog, CatalogSource, SourceFetcher};
use jpaddr_core::Normalizer;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Write a one-city dataset in the published directory layout under `root`
pub fn write_dataset(root: &Path) {
    fs::write(root.join("ja.json"), r#"{"神奈川県":["横浜市港北区"]}"#).unwrap();

    let kanagawa = root.join("ja").join("神奈川県");
    fs::create_dir_all(&kanagawa).unwrap();
    fs::write(
        kanagawa.join("横浜市港北区.json"),
        r#"[{"town":"大豆戸町","koaza":"","lat":"35.513492","lng":"139.625992"}]"#,
    )
    .unwrap();
}

/// Normalizer reading the dataset written by [`write_dataset`]
pub fn local_normalizer(root: &Path) -> Normalizer<CachedCatalog<SourceFetcher>> {
    let source = CatalogSource::parse(root.join("ja").to_str().unwrap()).unwrap();
    let catalog = CachedCatalog::new(SourceFetcher::new().unwrap(), source, Duration::from_secs(60))
        .with_max_retry_wait(Duration::from_millis(50));
    Normalizer::new(catalog)
}
