// =============================================================================
// Screener Configuration — settings file with serde defaults
// =============================================================================
//
// Central configuration for the screening engine: per-category symbol lists,
// threshold filters and ranking criteria, plus the setup parameters shared by
// every category. Every field carries a serde default so an older or partial
// settings file keeps loading as new knobs are added.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::filters::FilterConfig;
use crate::gaussian_ahp::CriterionConfig;
use crate::setups::{CrossoverParams, LarryWilliamsParams};
use crate::types::Category;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_out_dir() -> PathBuf {
    PathBuf::from("Resultados")
}

fn stocks_symbols() -> Vec<String> {
    ["PETR4", "VALE3", "ITUB4", "BBAS3", "WEGE3", "TAEE11"]
        .map(String::from)
        .to_vec()
}

fn stocks_criteria() -> CriterionConfig {
    [
        ("DY", 1.0),
        ("ROE", 1.0),
        ("ROIC", 1.0),
        ("P/L", -1.0),
        ("P/VP", -1.0),
    ]
    .into_iter()
    .map(|(name, dir)| (name.to_string(), dir))
    .collect()
}

fn bdrs_symbols() -> Vec<String> {
    ["AAPL34", "MSFT34", "AMZO34", "GOGL34"]
        .map(String::from)
        .to_vec()
}

fn bdrs_criteria() -> CriterionConfig {
    [("DY", 1.0), ("ROE", 1.0), ("P/L", -1.0), ("P/VP", -1.0)]
        .into_iter()
        .map(|(name, dir)| (name.to_string(), dir))
        .collect()
}

fn funds_symbols() -> Vec<String> {
    ["MXRF11", "HGLG11", "KNRI11", "XPML11", "VISC11"]
        .map(String::from)
        .to_vec()
}

fn funds_criteria() -> CriterionConfig {
    [("DY", 1.0), ("LIQ. MED.", 1.0), ("P/VP", -1.0)]
        .into_iter()
        .map(|(name, dir)| (name.to_string(), dir))
        .collect()
}

fn default_stocks() -> CategorySettings {
    CategorySettings {
        symbols: stocks_symbols(),
        filter: FilterConfig::new(),
        criteria: stocks_criteria(),
    }
}

fn default_bdrs() -> CategorySettings {
    CategorySettings {
        symbols: bdrs_symbols(),
        filter: FilterConfig::new(),
        criteria: bdrs_criteria(),
    }
}

fn default_funds() -> CategorySettings {
    CategorySettings {
        symbols: funds_symbols(),
        filter: FilterConfig::new(),
        criteria: funds_criteria(),
    }
}

// =============================================================================
// Config sections
// =============================================================================

/// Per-category screening settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorySettings {
    /// Symbols the scraper collects for this category.
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Threshold bounds applied after normalisation. Empty = keep everything.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Ranking criteria by signed direction. All-zero/empty skips ranking.
    #[serde(default)]
    pub criteria: CriterionConfig,
}

/// Parameters for the two technical setups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupsConfig {
    #[serde(default)]
    pub crossover: CrossoverParams,

    #[serde(default)]
    pub larry_williams: LarryWilliamsParams,
}

/// Top-level settings for the screening engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    #[serde(default = "default_stocks")]
    pub acoes: CategorySettings,

    #[serde(default = "default_bdrs")]
    pub bdrs: CategorySettings,

    #[serde(default = "default_funds")]
    pub fiis: CategorySettings,

    #[serde(default)]
    pub setups: SetupsConfig,

    /// Root directory for exported result files.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            acoes: default_stocks(),
            bdrs: default_bdrs(),
            fiis: default_funds(),
            setups: SetupsConfig::default(),
            out_dir: default_out_dir(),
        }
    }
}

impl ScreenerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// Missing file or invalid JSON is an error so the caller can decide
    /// whether to fall back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings from {}", path.display()))?;

        info!(
            path = %path.display(),
            acoes = config.acoes.symbols.len(),
            bdrs = config.bdrs.symbols.len(),
            fiis = config.fiis.symbols.len(),
            "settings loaded"
        );

        Ok(config)
    }

    /// The settings section for one category.
    pub fn category(&self, category: Category) -> &CategorySettings {
        match category {
            Category::Stocks => &self.acoes,
            Category::Bdrs => &self.bdrs,
            Category::Funds => &self.fiis,
        }
    }
}
