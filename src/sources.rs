// =============================================================================
// Input Sources — scraped snapshot and price-history files
// =============================================================================
//
// The scraper and the price-history provider run out of process and hand
// their results over as JSON files. These loaders are the only places the
// engine touches the filesystem on the input side; everything downstream
// works on in-memory tables and series.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{Category, PriceSeries, RawRecord};

/// One scraping run: the category that was fetched plus its raw records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub category: Category,
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

/// Load a scraped snapshot from a JSON file.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot from {}", path.display()))?;

    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot from {}", path.display()))?;

    info!(
        path = %path.display(),
        category = %snapshot.category,
        records = snapshot.records.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Load per-symbol price histories from a JSON file holding an array of
/// series. Later duplicates of a symbol win, matching a re-downloaded file.
pub fn load_histories(path: impl AsRef<Path>) -> Result<HashMap<String, PriceSeries>> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read price histories from {}", path.display()))?;

    let series: Vec<PriceSeries> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse price histories from {}", path.display()))?;

    let mut histories = HashMap::with_capacity(series.len());
    for s in series {
        histories.insert(s.symbol.clone(), s);
    }

    info!(
        path = %path.display(),
        symbols = histories.len(),
        "price histories loaded"
    );
    Ok(histories)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("nexus-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn snapshot_roundtrip() {
        let json = r#"{
            "category": "fiis",
            "records": [
                { "symbol": "MXRF11", "fields": { "COTAÇÃO": "R$ 10,00", "DY": "12,1" } }
            ]
        }"#;
        let path = temp_file("snapshot.json", json);
        let snapshot = load_snapshot(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(snapshot.category, Category::Funds);
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].symbol, "MXRF11");
        assert_eq!(
            snapshot.records[0].fields.get("DY").map(String::as_str),
            Some("12,1")
        );
    }

    #[test]
    fn histories_are_keyed_by_symbol() {
        let json = r#"[
            {
                "symbol": "PETR4",
                "candles": [
                    { "date": "2024-01-02", "open": 1.0, "high": 1.2,
                      "low": 0.9, "close": 1.1, "volume": 1000.0 }
                ]
            }
        ]"#;
        let path = temp_file("histories.json", json);
        let histories = load_histories(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(histories.len(), 1);
        assert_eq!(histories["PETR4"].candles[0].close, 1.1);
    }

    #[test]
    fn missing_file_is_a_contextual_error() {
        let err = load_snapshot("/nonexistent/snapshot.json").unwrap_err();
        assert!(err.to_string().contains("snapshot"));
    }
}
