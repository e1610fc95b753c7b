// =============================================================================
// Screening Pipeline — normalise, filter, rank, evaluate setups
// =============================================================================
//
// One orchestrator covers every instrument category; the category value
// selects the column schema and config section instead of a class per page
// type. Stage order over one input table:
//
//   normalise -> funds enrichment (fiis only) -> threshold filter
//             -> Gaussian-AHP ranking (when criteria configured)
//             -> setup evaluation (when price history supplied)
//
// Normalisation, filter and ranking faults abort the batch: a partially
// corrupted table would silently skew the Gaussian weights. Setup faults are
// scoped to their symbol and only cost that symbol its volatility value.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::info;

use crate::config::ScreenerConfig;
use crate::error::{Result, ScreenError};
use crate::filters::ThresholdFilter;
use crate::gaussian_ahp;
use crate::normalizer::{self, NumericKind};
use crate::observer::{ScreenObserver, TracingObserver};
use crate::setups::{crossover, SetupEngine};
use crate::types::{Category, Cell, ColumnKind, PriceSeries, RawRecord, Row, Table};

/// Setup result columns appended to the final table.
pub const LARRY_WILLIAMS_COLUMN: &str = "LARRY WILLIAMS";
pub const CROSSOVER_COLUMN: &str = "CRUZAMENTO DE MÉDIAS";
pub const VOLATILITY_COLUMN: &str = "VOLA. ANUAL";

/// Derived yield columns added for real-estate funds.
pub const MONTHLY_YIELD_COLUMN: &str = "% ÚLT. RENDIMENTO (M)";
pub const ANNUAL_YIELD_COLUMN: &str = "% ÚLT. RENDIMENTO (A)";

/// Fund duration labels accepted by the fiis pre-filter; anything else is a
/// non-fund row scraped off a listing page.
const FUND_DURATIONS: [&str; 2] = ["INDETERMINADO", "DETERMINADO"];

/// Rendered cell for a value that could not be computed for a symbol.
const NO_VALUE: &str = "-";

/// The category-polymorphic screening orchestrator.
pub struct Screener {
    config: ScreenerConfig,
    setups: SetupEngine,
    observer: Box<dyn ScreenObserver>,
}

impl Screener {
    /// Build a screener that reports progress through `tracing`.
    pub fn new(config: ScreenerConfig) -> Self {
        Self::with_observer(config, Box::new(TracingObserver))
    }

    /// Build a screener with an injected progress observer.
    pub fn with_observer(config: ScreenerConfig, observer: Box<dyn ScreenObserver>) -> Self {
        let setups = SetupEngine::new(
            config.setups.crossover.clone(),
            config.setups.larry_williams.clone(),
        );
        Self {
            config,
            setups,
            observer,
        }
    }

    /// Run the full pipeline for one category.
    ///
    /// `histories` maps symbols to their price series; an empty map skips
    /// setup evaluation entirely (the table is still filtered and ranked).
    pub fn run(
        &self,
        category: Category,
        records: &[RawRecord],
        histories: &HashMap<String, PriceSeries>,
    ) -> Result<Table> {
        let settings = self.config.category(category);

        self.observer.stage_started("normalise", records.len());
        let mut table = self.normalize(category, records)?;

        if category == Category::Funds {
            self.observer.stage_started("enrich", table.len());
            table = self.enrich_funds(table)?;
        }

        self.observer.stage_started("filter", table.len());
        table = ThresholdFilter::apply(&table, &settings.filter, &*self.observer)?;

        if settings.criteria.values().any(|d| *d != 0.0) {
            self.observer.stage_started("rank", table.len());
            table = gaussian_ahp::rank(&table, &settings.criteria)?;
        }

        if !histories.is_empty() {
            self.observer.stage_started("setups", table.len());
            self.append_setups(&mut table, histories);
        }

        info!(
            category = %category,
            scraped = records.len(),
            surviving = table.len(),
            "screening complete"
        );
        Ok(table)
    }

    /// Cheap first pass run before any scraping: keep only the symbols whose
    /// most recent bar completes a bullish moving-average crossover. The
    /// result is sorted for reproducible scrape order.
    pub fn prescreen(&self, histories: &HashMap<String, PriceSeries>) -> Vec<String> {
        let mut alerts: Vec<String> = histories
            .values()
            .filter(|series| crossover::evaluate(&series.closes(), &self.setups.crossover))
            .map(|series| series.symbol.clone())
            .collect();
        alerts.sort();
        alerts
    }

    /// Convert raw scraped records into a typed table per the category
    /// schema, applying the sentinel and locale rules uniformly.
    fn normalize(&self, category: Category, records: &[RawRecord]) -> Result<Table> {
        let settings = self.config.category(category);
        let schema = category.schema();

        // Columns a row cannot be missing outright: everything a filter
        // bound or a nonzero criterion will read.
        let required: BTreeSet<&str> = settings
            .filter
            .keys()
            .map(String::as_str)
            .chain(
                settings
                    .criteria
                    .iter()
                    .filter(|(_, d)| **d != 0.0)
                    .map(|(name, _)| name.as_str()),
            )
            .collect();

        let mut table =
            Table::with_columns(schema.iter().map(|spec| spec.name.to_string()).collect());
        let mut substitutions: BTreeMap<&str, usize> = BTreeMap::new();

        for record in records {
            let mut cells = Vec::with_capacity(schema.len());
            for spec in schema {
                let raw = record.fields.get(spec.name);

                let kind = match spec.kind {
                    ColumnKind::Text => {
                        cells.push(Cell::Text(raw.cloned().unwrap_or_default()));
                        continue;
                    }
                    ColumnKind::Float => NumericKind::Float,
                    ColumnKind::Integer => NumericKind::Integer,
                };

                let raw = match raw {
                    Some(raw) => raw.as_str(),
                    None if required.contains(spec.name) => {
                        return Err(ScreenError::malformed(
                            spec.name,
                            &record.symbol,
                            "<absent>",
                        ));
                    }
                    // Unconstrained metric the scraper did not deliver:
                    // treated as the pages' no-data sentinel.
                    None => "",
                };

                match normalizer::normalize(raw, kind) {
                    Some(normalized) => {
                        if normalized.substituted {
                            *substitutions.entry(spec.name).or_insert(0) += 1;
                        }
                        cells.push(normalized.cell);
                    }
                    None => {
                        return Err(ScreenError::malformed(spec.name, &record.symbol, raw));
                    }
                }
            }
            table.rows.push(Row {
                symbol: record.symbol.clone(),
                cells,
            });
        }

        for (column, count) in substitutions {
            self.observer.sentinel_substitutions(column, count);
        }
        Ok(table)
    }

    /// Funds-only enrichment: drop non-fund rows and derive the monthly and
    /// annualised last-income yields from the quote.
    fn enrich_funds(&self, table: Table) -> Result<Table> {
        let duration_idx = table
            .column_index("PRAZO DE DURAÇÃO")
            .ok_or_else(|| ScreenError::unknown_column("PRAZO DE DURAÇÃO"))?;
        let quote_idx = table
            .column_index("COTAÇÃO")
            .ok_or_else(|| ScreenError::unknown_column("COTAÇÃO"))?;
        let income_idx = table
            .column_index("ÚLT. RENDIMENTO")
            .ok_or_else(|| ScreenError::unknown_column("ÚLT. RENDIMENTO"))?;

        let mut out = Table::with_columns(table.columns.clone());
        for row in table.rows {
            let duration = match &row.cells[duration_idx] {
                Cell::Text(s) => s.as_str(),
                _ => "",
            };
            if FUND_DURATIONS.contains(&duration) {
                out.rows.push(row);
            } else {
                self.observer
                    .row_rejected(&row.symbol, &format!("PRAZO DE DURAÇÃO = {duration:?}"));
            }
        }

        let mut monthly = Vec::with_capacity(out.len());
        let mut annual = Vec::with_capacity(out.len());
        for row in &out.rows {
            let quote = row.cells[quote_idx].as_f64().unwrap_or(0.0);
            let income = row.cells[income_idx].as_f64().unwrap_or(0.0);
            if quote == 0.0 {
                return Err(ScreenError::degenerate(
                    "COTAÇÃO",
                    format!("zero quote for {}; yield is undefined", row.symbol),
                ));
            }
            let pct = income / quote * 100.0;
            monthly.push(Cell::Float(pct));
            annual.push(Cell::Float(pct * 12.0));
        }
        out.push_column(MONTHLY_YIELD_COLUMN, monthly);
        out.push_column(ANNUAL_YIELD_COLUMN, annual);
        Ok(out)
    }

    /// Evaluate the setups per surviving symbol and append the result
    /// columns. Per-symbol faults are surfaced and cost only that symbol's
    /// value.
    fn append_setups(&self, table: &mut Table, histories: &HashMap<String, PriceSeries>) {
        let mut larry = Vec::with_capacity(table.len());
        let mut crossover = Vec::with_capacity(table.len());
        let mut volatility = Vec::with_capacity(table.len());

        for row in &table.rows {
            match histories.get(&row.symbol) {
                Some(series) => {
                    let (report, fault) = self.setups.evaluate(series);
                    if let Some(fault) = fault {
                        self.observer.symbol_fault(&row.symbol, &fault);
                    }
                    larry.push(Cell::Bool(report.larry_williams));
                    crossover.push(Cell::Bool(report.crossover));
                    volatility.push(match report.annual_volatility {
                        Some(v) => Cell::Float(v),
                        None => Cell::Text(NO_VALUE.into()),
                    });
                }
                None => {
                    let fault = ScreenError::insufficient_history(&row.symbol, 2, 0);
                    self.observer.symbol_fault(&row.symbol, &fault);
                    larry.push(Cell::Bool(false));
                    crossover.push(Cell::Bool(false));
                    volatility.push(Cell::Text(NO_VALUE.into()));
                }
            }
        }

        table.push_column(LARRY_WILLIAMS_COLUMN, larry);
        table.push_column(CROSSOVER_COLUMN, crossover);
        table.push_column(VOLATILITY_COLUMN, volatility);
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::NaiveDate;

    use crate::config::CategorySettings;
    use crate::filters::Bound;
    use crate::gaussian_ahp::RANKING_COLUMN;
    use crate::types::Candle;

    /// Observer that records events for assertions; shared with the test
    /// through an `Rc` handle.
    #[derive(Default)]
    struct RecordingObserver {
        substitutions: RefCell<Vec<(String, usize)>>,
        rejected: RefCell<Vec<String>>,
        faults: RefCell<Vec<String>>,
    }

    struct SharedObserver(Rc<RecordingObserver>);

    impl ScreenObserver for SharedObserver {
        fn sentinel_substitutions(&self, column: &str, count: usize) {
            self.0
                .substitutions
                .borrow_mut()
                .push((column.to_string(), count));
        }

        fn row_rejected(&self, symbol: &str, _reason: &str) {
            self.0.rejected.borrow_mut().push(symbol.to_string());
        }

        fn symbol_fault(&self, symbol: &str, _error: &ScreenError) {
            self.0.faults.borrow_mut().push(symbol.to_string());
        }
    }

    fn record(symbol: &str, fields: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            symbol: symbol.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn stocks_config(filter: &[(&str, Bound)], criteria: &[(&str, f64)]) -> ScreenerConfig {
        let mut config = ScreenerConfig::default();
        config.acoes = CategorySettings {
            symbols: Vec::new(),
            filter: filter
                .iter()
                .map(|(name, b)| (name.to_string(), *b))
                .collect(),
            criteria: criteria
                .iter()
                .map(|(name, d)| (name.to_string(), *d))
                .collect(),
        };
        config
    }

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries {
            symbol: symbol.to_string(),
            candles: closes
                .iter()
                .enumerate()
                .map(|(i, &close)| Candle {
                    date: start + chrono::Days::new(i as u64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 0.0,
                })
                .collect(),
        }
    }

    fn ranked_symbols(t: &Table) -> Vec<&str> {
        t.rows.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn stocks_end_to_end_filters_and_ranks() {
        let config = stocks_config(
            &[(
                "DY",
                Bound {
                    min: Some(5.0),
                    max: None,
                },
            )],
            &[("DY", 1.0)],
        );
        let screener = Screener::new(config);

        let records = vec![
            record("AAAA3", &[("DY", "7,5"), ("SETOR", "Energia")]),
            record("BBBB3", &[("DY", "4,0")]),
            record("CCCC3", &[("DY", "10,0")]),
        ];

        let table = screener
            .run(Category::Stocks, &records, &HashMap::new())
            .unwrap();

        assert_eq!(ranked_symbols(&table), vec!["CCCC3", "AAAA3"]);
        let idx = table.column_index(RANKING_COLUMN).unwrap();
        assert_eq!(table.rows[0].cells[idx], Cell::Integer(1));
        assert_eq!(table.rows[1].cells[idx], Cell::Integer(2));
        // No price history supplied: no setup columns.
        assert!(table.column_index(VOLATILITY_COLUMN).is_none());
    }

    #[test]
    fn malformed_cell_aborts_the_batch() {
        let config = stocks_config(&[], &[("DY", 1.0)]);
        let screener = Screener::new(config);

        let records = vec![
            record("AAAA3", &[("DY", "7,5")]),
            record("BBBB3", &[("DY", "sem dados")]),
        ];
        let err = screener
            .run(Category::Stocks, &records, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, ScreenError::MalformedValue { .. }));
        assert!(err.to_string().contains("BBBB3"));
        assert!(err.to_string().contains("DY"));
    }

    #[test]
    fn absent_required_metric_aborts_the_batch() {
        let config = stocks_config(&[], &[("ROE", 1.0)]);
        let screener = Screener::new(config);

        let records = vec![record("AAAA3", &[("DY", "7,5")])];
        let err = screener
            .run(Category::Stocks, &records, &HashMap::new())
            .unwrap_err();
        assert!(err.to_string().contains("ROE"));
        assert!(err.to_string().contains("<absent>"));
    }

    #[test]
    fn sentinel_zero_fills_are_reported_not_silent() {
        let config = stocks_config(&[], &[("DY", 1.0)]);
        let recorder = Rc::new(RecordingObserver::default());
        let screener =
            Screener::with_observer(config, Box::new(SharedObserver(recorder.clone())));

        let records = vec![
            record("AAAA3", &[("DY", "7,5"), ("PAYOUT", "-")]),
            record("BBBB3", &[("DY", "5,0"), ("PAYOUT", "-")]),
        ];
        screener
            .run(Category::Stocks, &records, &HashMap::new())
            .unwrap();

        let subs = recorder.substitutions.borrow();
        assert!(subs
            .iter()
            .any(|(column, count)| column == "PAYOUT" && *count == 2));
    }

    #[test]
    fn funds_enrichment_derives_yields_and_drops_non_funds() {
        let mut config = ScreenerConfig::default();
        config.fiis = CategorySettings::default();
        let recorder = Rc::new(RecordingObserver::default());
        let screener =
            Screener::with_observer(config, Box::new(SharedObserver(recorder.clone())));

        let fields_a: &[(&str, &str)] = &[
            ("COTAÇÃO", "R$ 100,00"),
            ("ÚLT. RENDIMENTO", "1,00"),
            ("PRAZO DE DURAÇÃO", "INDETERMINADO"),
        ];
        let fields_b: &[(&str, &str)] = &[
            ("COTAÇÃO", "R$ 50,00"),
            ("ÚLT. RENDIMENTO", "0,25"),
            ("PRAZO DE DURAÇÃO", "FII DE FUNDOS"),
        ];
        let records = vec![record("AAAA11", fields_a), record("BBBB11", fields_b)];

        let table = screener
            .run(Category::Funds, &records, &HashMap::new())
            .unwrap();

        // The non-fund row is rejected by the duration pre-filter.
        assert_eq!(ranked_symbols(&table), vec!["AAAA11"]);
        assert_eq!(recorder.rejected.borrow().as_slice(), ["BBBB11"]);

        let monthly_idx = table.column_index(MONTHLY_YIELD_COLUMN).unwrap();
        let annual_idx = table.column_index(ANNUAL_YIELD_COLUMN).unwrap();
        let monthly = table.rows[0].cells[monthly_idx].as_f64().unwrap();
        let annual = table.rows[0].cells[annual_idx].as_f64().unwrap();
        assert!((monthly - 1.0).abs() < 1e-9);
        assert!((annual - 12.0).abs() < 1e-9);
    }

    #[test]
    fn funds_zero_quote_faults_instead_of_dividing() {
        let mut config = ScreenerConfig::default();
        config.fiis = CategorySettings::default();
        let screener = Screener::new(config);

        let fields: &[(&str, &str)] = &[
            ("COTAÇÃO", "-"),
            ("ÚLT. RENDIMENTO", "1,00"),
            ("PRAZO DE DURAÇÃO", "DETERMINADO"),
        ];
        let records = vec![record("AAAA11", fields)];
        let err = screener
            .run(Category::Funds, &records, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, ScreenError::DegenerateCriterion { .. }));
        assert!(err.to_string().contains("AAAA11"));
    }

    #[test]
    fn setups_are_appended_per_symbol_with_scoped_faults() {
        let config = stocks_config(&[], &[("DY", 1.0)]);
        let recorder = Rc::new(RecordingObserver::default());
        let screener =
            Screener::with_observer(config, Box::new(SharedObserver(recorder.clone())));

        let records = vec![
            record("AAAA3", &[("DY", "7,5")]),
            record("BBBB3", &[("DY", "5,0")]),
        ];
        // AAAA3 has a usable flat history; BBBB3 has none.
        let mut histories = HashMap::new();
        histories.insert("AAAA3".to_string(), series("AAAA3", &[100.0; 40]));

        let table = screener.run(Category::Stocks, &records, &histories).unwrap();

        let vol_idx = table.column_index(VOLATILITY_COLUMN).unwrap();
        let lw_idx = table.column_index(LARRY_WILLIAMS_COLUMN).unwrap();
        let cross_idx = table.column_index(CROSSOVER_COLUMN).unwrap();

        for row in &table.rows {
            match row.symbol.as_str() {
                "AAAA3" => {
                    assert_eq!(row.cells[vol_idx].as_f64(), Some(0.0));
                    assert_eq!(row.cells[lw_idx], Cell::Bool(false));
                    assert_eq!(row.cells[cross_idx], Cell::Bool(false));
                }
                "BBBB3" => {
                    assert_eq!(row.cells[vol_idx], Cell::Text("-".into()));
                    assert_eq!(row.cells[lw_idx], Cell::Bool(false));
                }
                other => panic!("unexpected symbol {other}"),
            }
        }

        let faults = recorder.faults.borrow();
        assert_eq!(faults.as_slice(), ["BBBB3"]);
    }

    #[test]
    fn prescreen_keeps_only_fresh_crossovers() {
        use crate::setups::CrossoverParams;

        let mut config = stocks_config(&[], &[]);
        config.setups.crossover = CrossoverParams {
            short_period: 1,
            long_period: 3,
            exponential: false,
        };
        let screener = Screener::new(config);

        let mut histories = HashMap::new();
        histories.insert(
            "CROSS3".to_string(),
            series("CROSS3", &[10.0, 9.0, 8.0, 7.0, 20.0]),
        );
        histories.insert("FLAT3".to_string(), series("FLAT3", &[10.0; 5]));

        assert_eq!(screener.prescreen(&histories), vec!["CROSS3"]);
    }

    #[test]
    fn ranking_is_skipped_without_criteria() {
        let config = stocks_config(&[], &[]);
        let screener = Screener::new(config);
        let records = vec![record("AAAA3", &[("DY", "2,0")])];
        let table = screener
            .run(Category::Stocks, &records, &HashMap::new())
            .unwrap();
        assert!(table.column_index(RANKING_COLUMN).is_none());
        assert_eq!(table.len(), 1);
    }
}
