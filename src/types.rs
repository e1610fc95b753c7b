// =============================================================================
// Shared types used across the Invest Nexus screening engine
// =============================================================================
//
// The central structure is `Table`: an ordered header plus rows of typed
// cells, one row per traded instrument. Raw scraped records enter as string
// maps, are normalised into `Cell`s, and leave annotated with ranking and
// setup columns. Insertion order is the scrape order; only the ranker
// re-sorts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScreenError;

/// Name of the instrument-symbol column in exported tables.
pub const SYMBOL_COLUMN: &str = "ATIVO";

// =============================================================================
// Categories & schemas
// =============================================================================

/// Instrument category being screened. The serialised keys match the fetch
/// keys used by the upstream scraper's page URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "acoes")]
    Stocks,
    #[serde(rename = "bdrs")]
    Bdrs,
    #[serde(rename = "fiis")]
    Funds,
}

impl Category {
    /// Stable key used for config sections and output directories.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Stocks => "acoes",
            Self::Bdrs => "bdrs",
            Self::Funds => "fiis",
        }
    }

    /// Parse a category from its key. Accepts exactly the serialised keys.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "acoes" => Some(Self::Stocks),
            "bdrs" => Some(Self::Bdrs),
            "fiis" => Some(Self::Funds),
            _ => None,
        }
    }

    /// The column schema the scraper delivers for this category's pages.
    pub fn schema(&self) -> &'static [ColumnSpec] {
        match self {
            Self::Stocks => STOCKS_SCHEMA,
            Self::Bdrs => BDRS_SCHEMA,
            Self::Funds => FUNDS_SCHEMA,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// How a scraped column is interpreted during normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Float,
    Integer,
    Text,
}

/// One column of a category schema.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn float(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Float,
    }
}

const fn integer(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Integer,
    }
}

const fn text(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Text,
    }
}

/// Indicators scraped from an `acoes` (stock) page.
static STOCKS_SCHEMA: &[ColumnSpec] = &[
    float("COTAÇÃO"),
    float("VARIAÇÃO (12M)"),
    float("P/L"),
    float("P/VP"),
    float("DY"),
    float("PAYOUT"),
    float("ROE"),
    float("ROIC"),
    float("LPA"),
    float("VPA"),
    float("P/EBIT"),
    float("DÍVIDA LÍQUIDA / PATRIMÔNIO"),
    float("DÍVIDA LÍQUIDA / EBITDA"),
    float("DÍVIDA LÍQUIDA / EBIT"),
    float("CAGR RECEITAS 5 ANOS"),
    float("CAGR LUCROS 5 ANOS"),
    text("SETOR"),
    text("SUBSETOR"),
];

/// Indicators scraped from a `bdrs` page.
static BDRS_SCHEMA: &[ColumnSpec] = &[
    float("COTAÇÃO"),
    float("VARIAÇÃO (12M)"),
    float("P/L"),
    float("P/VP"),
    float("DY"),
    float("ROE"),
    float("ROIC"),
    float("LPA"),
    float("VPA"),
    float("P/EBIT"),
    text("SETOR"),
    text("INDUSTRIA"),
    text("PARIDADE DA BDR"),
];

/// Indicators scraped from a `fiis` (real-estate fund) page.
static FUNDS_SCHEMA: &[ColumnSpec] = &[
    float("COTAÇÃO"),
    float("DY"),
    float("P/VP"),
    float("VPA"),
    float("VACÂNCIA"),
    float("ÚLT. RENDIMENTO"),
    integer("LIQ. MED."),
    integer("N. DE COTISTAS"),
    text("RAZÃO SOCIAL"),
    text("CNPJ"),
    text("SEGMENTO"),
    text("TIPO"),
    text("PRAZO DE DURAÇÃO"),
    text("TAXA DE ADMINISTRAÇÃO"),
];

// =============================================================================
// Raw input
// =============================================================================

/// One scraped row as delivered by the external scraper: the instrument
/// symbol plus a map of metric name to raw page text. Missing metrics use
/// the `"-"` / empty-string sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub symbol: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

// =============================================================================
// Normalised table
// =============================================================================

/// A single typed cell of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Float(f64),
    Integer(i64),
    Bool(bool),
}

impl Cell {
    /// Numeric view of the cell; `None` for text and boolean cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            Self::Text(_) | Self::Bool(_) => None,
        }
    }

    /// Render the cell for tabular output.
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Float(v) => format!("{v}"),
            Self::Integer(v) => format!("{v}"),
            Self::Bool(b) => format!("{b}"),
        }
    }
}

/// One instrument's row, cells aligned with the owning table's header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub symbol: String,
    pub cells: Vec<Cell>,
}

/// An ordered header plus rows of typed cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column in the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a column. The number of cells must match the number of rows.
    ///
    /// # Panics
    /// Panics when the cell count does not match the row count; the pipeline
    /// only ever appends columns it derived from the same rows.
    pub fn push_column(&mut self, name: impl Into<String>, cells: Vec<Cell>) {
        assert_eq!(
            cells.len(),
            self.rows.len(),
            "column length must match row count"
        );
        self.columns.push(name.into());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.cells.push(cell);
        }
    }

    /// Extract a column as `f64` values.
    ///
    /// Fails with `UnknownColumn` when the column is absent from the header
    /// or carries non-numeric cells.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, ScreenError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| ScreenError::unknown_column(name))?;

        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            match row.cells[idx].as_f64() {
                Some(v) => values.push(v),
                None => return Err(ScreenError::unknown_column(name)),
            }
        }
        Ok(values)
    }
}

// =============================================================================
// Price history
// =============================================================================

/// One daily bar of a price series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronological daily history for one instrument, as delivered by the
/// external price provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub candles: Vec<Candle>,
}

impl PriceSeries {
    /// The close series in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

/// Per-symbol outcome of the setup evaluators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReport {
    pub larry_williams: bool,
    pub crossover: bool,
    /// Annualised volatility in percent; `None` when the computation faulted
    /// for this symbol.
    pub annual_volatility: Option<f64>,
}
