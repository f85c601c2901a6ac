//! Catalog reads from a local directory laid out like the published dataset

use jpaddr_catalog::{CachedCatalog, CatalogSource, SourceFetcher};
use jpaddr_common::ReferenceCatalog;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn write_dataset(root: &Path) {
    fs::write(
        root.join("ja.json"),
        r#"{"東京都":["千代田区","文京区"],"北海道":["札幌市中央区"]}"#,
    )
    .unwrap();

    let tokyo = root.join("ja").join("東京都");
    fs::create_dir_all(&tokyo).unwrap();
    fs::write(
        tokyo.join("文京区.json"),
        r#"[
            {"town":"千石四丁目","koaza":"","lat":35.726,"lng":139.744},
            {"town":"本駒込二丁目","koaza":"","lat":"35.728","lng":"139.752"},
            {"town":"白山一丁目","lat":null,"lng":"n/a"}
        ]"#,
    )
    .unwrap();
}

fn local_catalog(root: &Path) -> CachedCatalog<SourceFetcher> {
    let source = CatalogSource::parse(root.join("ja").to_str().unwrap()).unwrap();
    CachedCatalog::new(SourceFetcher::new().unwrap(), source, Duration::from_secs(60))
        .with_max_retry_wait(Duration::from_millis(50))
}

#[tokio::test]
async fn test_prefecture_table_preserves_order() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let catalog = local_catalog(dir.path());

    let table = catalog.prefecture_table().await;
    let prefectures: Vec<&str> = table.prefectures().collect();
    assert_eq!(prefectures, vec!["東京都", "北海道"]);
    assert_eq!(
        table.cities("東京都").unwrap(),
        &["千代田区".to_string(), "文京区".to_string()]
    );
}

#[tokio::test]
async fn test_town_coordinates_are_lenient() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let catalog = local_catalog(dir.path());

    let towns = catalog.towns("東京都", "文京区").await;
    assert_eq!(towns.len(), 3);
    assert_eq!(towns[0].lat, Some(35.726));
    assert_eq!(towns[1].town, "本駒込二丁目");
    assert_eq!(towns[1].lat, Some(35.728));
    assert_eq!(towns[1].lng, Some(139.752));
    assert_eq!(towns[2].koaza, "");
    assert_eq!(towns[2].lat, None);
    assert_eq!(towns[2].lng, None);
}

#[tokio::test]
async fn test_missing_city_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let catalog = local_catalog(dir.path());

    let towns = catalog.towns("東京都", "千代田区").await;
    assert!(towns.is_empty());
    assert_eq!(catalog.cached_entries(), 0);
}

#[tokio::test]
async fn test_missing_dataset_reads_as_empty_table() {
    let dir = TempDir::new().unwrap();
    let catalog = local_catalog(dir.path());

    assert!(catalog.prefecture_table().await.is_empty());
}

#[tokio::test]
async fn test_cached_read_survives_file_removal() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let catalog = local_catalog(dir.path());

    assert_eq!(catalog.towns("東京都", "文京区").await.len(), 3);
    fs::remove_file(dir.path().join("ja").join("東京都").join("文京区.json")).unwrap();
    assert_eq!(catalog.towns("東京都", "文京区").await.len(), 3);

    catalog.clear();
    assert!(catalog.towns("東京都", "文京区").await.is_empty());
}
