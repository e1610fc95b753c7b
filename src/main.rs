// =============================================================================
// Invest Nexus — Main Entry Point
// =============================================================================
//
// Batch driver: load the settings file, ingest the scraped snapshot (and the
// optional price-history file), run the screening pipeline for the
// snapshot's category and export the result as CSV.
//
// All inputs are environment-driven:
//   NEXUS_CONFIG    settings file          (default: settings.json)
//   NEXUS_SNAPSHOT  scraped snapshot file  (default: snapshot.json)
//   NEXUS_HISTORY   price-history file     (optional; setups skipped without)
//   NEXUS_OUT       output root directory  (default: the settings' out_dir)
// =============================================================================

use std::collections::HashMap;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use invest_nexus::config::ScreenerConfig;
use invest_nexus::export::{CsvExporter, Exporter};
use invest_nexus::pipeline::Screener;
use invest_nexus::sources;

fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Invest Nexus — fundamental screening run starting");

    let config_path =
        std::env::var("NEXUS_CONFIG").unwrap_or_else(|_| "settings.json".to_string());
    let config = ScreenerConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "failed to load settings, using defaults");
        ScreenerConfig::default()
    });

    // ── 2. Inputs ────────────────────────────────────────────────────────
    let snapshot_path =
        std::env::var("NEXUS_SNAPSHOT").unwrap_or_else(|_| "snapshot.json".to_string());
    let snapshot = sources::load_snapshot(&snapshot_path)
        .with_context(|| format!("cannot screen without a snapshot ({snapshot_path})"))?;

    let histories = match std::env::var("NEXUS_HISTORY") {
        Ok(path) => sources::load_histories(&path)
            .with_context(|| format!("cannot read price histories ({path})"))?,
        Err(_) => {
            info!("no price-history file configured; setups will be skipped");
            HashMap::new()
        }
    };

    // ── 3. Screen & export ───────────────────────────────────────────────
    let out_dir = std::env::var("NEXUS_OUT")
        .map(Into::into)
        .unwrap_or_else(|_| config.out_dir.clone());

    let category = snapshot.category;
    let screener = Screener::new(config);
    let table = screener.run(category, &snapshot.records, &histories)?;

    let exporter = CsvExporter::new(out_dir);
    let path = exporter.export(&table, category)?;

    info!(
        category = %category,
        rows = table.len(),
        path = %path.display(),
        "screening run finished"
    );
    Ok(())
}
