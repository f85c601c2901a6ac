//! Shared fixtures for jpaddr-core integration tests
//!
//! Provides an in-memory catalog holding the slices of the reference data
//! the scenarios below need. Catalog order matters: prefectures are tried in
//! insertion order, and 東京都 is registered before 広島県 so that the
//! same-named 府中市 exercises prefecture inference.

#![allow(dead_code)]

use jpaddr_common::{InMemoryCatalog, TownRecord};
use jpaddr_core::Normalizer;

fn town(name: &str) -> TownRecord {
    TownRecord::new(name, None, None)
}

fn town_at(name: &str, lat: f64, lng: f64) -> TownRecord {
    TownRecord::new(name, Some(lat), Some(lng))
}

/// Catalog fixture covering every scenario in the integration tests
pub fn fixture_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_city("北海道", "札幌市西区", vec![town("二十四軒二条二丁目")])
        .with_city("岩手県", "盛岡市", vec![town("盛岡駅西通二丁目")])
        .with_city("埼玉県", "上尾市", vec![town("壱丁目")])
        .with_city("東京都", "文京区", vec![town("千石四丁目")])
        .with_city("東京都", "町田市", vec![town("木曽東四丁目")])
        .with_city("東京都", "府中市", vec![town("是政一丁目")])
        .with_city(
            "神奈川県",
            "横浜市港北区",
            vec![town_at("大豆戸町", 35.513492, 139.625992)],
        )
        .with_city("京都府", "京都市中京区", vec![town("上本能寺前町")])
        .with_city("大阪府", "堺市北区", vec![town("新金岡町四丁")])
        .with_city("大阪府", "大阪市中央区", vec![town("大手前二丁目")])
        .with_city("和歌山県", "和歌山市", vec![town("七番丁"), town("十二番丁")])
        .with_city(
            "和歌山県",
            "東牟婁郡串本町",
            vec![
                town_at("串本", 33.470896, 135.779087),
                town("鬮野川"),
                town("田並"),
            ],
        )
        .with_city("広島県", "府中市", vec![town("府川町")])
        .with_city("香川県", "丸亀市", vec![town("原田町")])
        .with_city("鹿児島県", "鹿児島市", vec![town_at("山下町", 31.596716, 130.55643)])
}

pub fn fixture_normalizer() -> Normalizer<InMemoryCatalog> {
    Normalizer::new(fixture_catalog())
}
