// =============================================================================
// Threshold Filter — per-column min/max bounds over the normalised table
// =============================================================================
//
// Each configured column carries an inclusive {min, max} pair; a row survives
// when every configured bound holds. The per-column predicates are
// independent, so filters commute and reapplying the same config is a no-op.
//
// Configuration referencing a column the table does not carry as numeric data
// is an error, never a silent skip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScreenError};
use crate::observer::ScreenObserver;
use crate::types::Table;

/// Inclusive bounds for one column. An absent side is unconstrained.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Bound {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl Bound {
    /// True when `value` satisfies both sides of the bound.
    pub fn admits(&self, value: f64) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        true
    }
}

/// Column name to bound mapping.
pub type FilterConfig = BTreeMap<String, Bound>;

pub struct ThresholdFilter;

impl ThresholdFilter {
    /// Apply every configured bound and return the surviving rows.
    ///
    /// Fails with `UnknownColumn` when a configured column is absent from
    /// the table header or non-numeric.
    pub fn apply(
        table: &Table,
        config: &FilterConfig,
        observer: &dyn ScreenObserver,
    ) -> Result<Table> {
        // Validate the whole config up front so a typo surfaces even when
        // the table is already empty.
        let mut predicates: Vec<(&str, Vec<f64>, &Bound)> = Vec::with_capacity(config.len());
        for (column, bound) in config {
            let values = table.numeric_column(column)?;
            predicates.push((column.as_str(), values, bound));
        }

        let mut out = Table::with_columns(table.columns.clone());
        for (row_idx, row) in table.rows.iter().enumerate() {
            let blocked = predicates
                .iter()
                .find(|(_, values, bound)| !bound.admits(values[row_idx]));

            match blocked {
                Some((column, values, _)) => {
                    let value = values[row_idx];
                    observer.row_rejected(&row.symbol, &format!("{column} = {value}"));
                    debug!(symbol = %row.symbol, column = %column, value, "row outside threshold");
                }
                None => out.rows.push(row.clone()),
            }
        }

        Ok(out)
    }
}
