// =============================================================================
// Invest Nexus — B3 fundamental screening engine
// =============================================================================
//
// Batch screening core for Brazilian equities, BDRs and real-estate funds:
// normalises scraped indicator tables, prunes them against configured
// thresholds, ranks survivors with the Gaussian-AHP method and cross-checks
// candidates against moving-average setups computed from price history.
//
// Scraping, price downloads and spreadsheet destinations live outside this
// crate; the engine consumes and produces in-memory tables and series, plus
// the thin JSON/CSV adapters in `sources` and `export`.

pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod gaussian_ahp;
pub mod indicators;
pub mod normalizer;
pub mod observer;
pub mod pipeline;
pub mod setups;
pub mod sources;
pub mod types;

pub use config::ScreenerConfig;
pub use error::ScreenError;
pub use pipeline::Screener;
pub use types::{Category, Table};
