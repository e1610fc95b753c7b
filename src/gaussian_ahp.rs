// =============================================================================
// Gaussian-AHP Ranker — dispersion-weighted multi-criteria ranking
// =============================================================================
//
// Ranks the screened instruments without hand-tuned weights. Each configured
// criterion is normalised against the current sample and then weighted by how
// much it actually discriminates between the alternatives:
//
//   1. Benefit criteria (direction > 0): divide by the column maximum.
//      Cost criteria (direction < 0): divide the column minimum by each value.
//   2. Gaussian factor per column = sample stddev / mean (the coefficient of
//      variation of the normalised column).
//   3. Factors are normalised to sum 1 => the criterion weights.
//   4. Score per row = sum of weight * normalised value; rows are ordered
//      best-first and receive a dense 1..N RANKING column. The raw score's
//      magnitude carries no meaning and is not exported.
//
// A column that is constant across the sample has factor 0 and simply drops
// out of the score. Columns that cannot be normalised without producing
// inf/NaN fault the whole call instead of corrupting the ordering.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, ScreenError};
use crate::types::{Cell, Table};

/// Name of the dense rank column appended to the output.
pub const RANKING_COLUMN: &str = "RANKING";

/// Criterion name to signed direction: positive = higher is better,
/// negative = lower is better, zero = excluded from scoring.
pub type CriterionConfig = BTreeMap<String, f64>;

/// The normalised projection of a table onto its active criteria.
struct Projection {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

fn active_criteria(criteria: &CriterionConfig) -> Vec<(&str, f64)> {
    criteria
        .iter()
        .filter(|(_, direction)| **direction != 0.0)
        .map(|(name, direction)| (name.as_str(), *direction))
        .collect()
}

fn normalized_column(table: &Table, column: &str, direction: f64) -> Result<Vec<f64>> {
    let values = table.numeric_column(column)?;

    if direction > 0.0 {
        // Benefit: column maximum maps to 1.0.
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if max == 0.0 {
            return Err(ScreenError::degenerate(
                column,
                "column maximum is zero under benefit normalisation",
            ));
        }
        Ok(values.iter().map(|v| v / max).collect())
    } else {
        // Cost: column minimum maps to 1.0; a zero value would divide by zero.
        if values.iter().any(|v| *v == 0.0) {
            return Err(ScreenError::degenerate(
                column,
                "zero value under cost normalisation",
            ));
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        Ok(values.iter().map(|v| min / v).collect())
    }
}

fn project(table: &Table, criteria: &CriterionConfig) -> Result<Projection> {
    let active = active_criteria(criteria);
    if active.is_empty() {
        return Err(ScreenError::degenerate(
            "criteria",
            "no nonzero-weighted criteria configured",
        ));
    }

    let mut names = Vec::with_capacity(active.len());
    let mut columns = Vec::with_capacity(active.len());
    for (name, direction) in active {
        columns.push(normalized_column(table, name, direction)?);
        names.push(name.to_string());
    }
    Ok(Projection { names, columns })
}

/// Gaussian factor of one normalised column: sample stddev over mean.
fn gaussian_factor(column: &str, values: &[f64]) -> Result<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return Err(ScreenError::degenerate(column, "column mean is zero"));
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Ok(variance.sqrt() / mean)
}

/// The data-driven criterion weights for a table, in criterion order.
///
/// Weights always sum to 1 for a valid configuration; a table with fewer
/// than two rows has no defined dispersion and is rejected.
pub fn criterion_weights(table: &Table, criteria: &CriterionConfig) -> Result<Vec<(String, f64)>> {
    if table.len() < 2 {
        return Err(ScreenError::degenerate(
            "criteria",
            "fewer than two rows; dispersion is undefined",
        ));
    }

    let projection = project(table, criteria)?;
    weights_of(&projection)
}

fn weights_of(projection: &Projection) -> Result<Vec<(String, f64)>> {
    let mut factors = Vec::with_capacity(projection.names.len());
    for (name, column) in projection.names.iter().zip(&projection.columns) {
        factors.push(gaussian_factor(name, column)?);
    }

    let total: f64 = factors.iter().sum();
    if total == 0.0 {
        return Err(ScreenError::degenerate(
            "criteria",
            "every criterion is constant across the sample",
        ));
    }

    Ok(projection
        .names
        .iter()
        .cloned()
        .zip(factors.iter().map(|f| f / total))
        .collect())
}

/// Rank the table best-first and append a dense 1..N `RANKING` column.
///
/// Ties keep their original (scrape) order. Tables with fewer than two rows
/// are returned as-is apart from the rank column; the criteria columns are
/// still validated so configuration typos surface regardless of batch size.
pub fn rank(table: &Table, criteria: &CriterionConfig) -> Result<Table> {
    let projection = project(table, criteria)?;

    if table.len() < 2 {
        let mut out = table.clone();
        let ranks = (1..=table.len() as i64).map(Cell::Integer).collect();
        out.push_column(RANKING_COLUMN, ranks);
        return Ok(out);
    }

    let weights = weights_of(&projection)?;
    debug!(?weights, rows = table.len(), "gaussian weights computed");

    let mut scores = vec![0.0_f64; table.len()];
    for ((_, weight), column) in weights.iter().zip(&projection.columns) {
        for (score, value) in scores.iter_mut().zip(column) {
            *score += weight * value;
        }
    }

    let mut order: Vec<usize> = (0..table.len()).collect();
    order.sort_by(|a, b| {
        scores[*b]
            .partial_cmp(&scores[*a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranked = Table::with_columns(table.columns.clone());
    for &idx in &order {
        ranked.rows.push(table.rows[idx].clone());
    }
    ranked.push_column(
        RANKING_COLUMN,
        (1..=order.len() as i64).map(Cell::Integer).collect(),
    );

    Ok(ranked)
}
