// =============================================================================
// Table Export — destination-agnostic trait + CSV implementation
// =============================================================================
//
// The engine hands its final annotated table to an `Exporter` and stays
// agnostic about the destination format. The shipped implementation writes
// CSV under a date-stamped directory per category:
//
//   <out_dir>/<dd-mm-YYYY>/<category>/indicadores-fundamentalistas.csv

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::types::{Category, Table, SYMBOL_COLUMN};

/// Writes a finished screening table somewhere an operator can read it.
pub trait Exporter {
    /// Export the table and return the path (or identifier) it landed at.
    fn export(&self, table: &Table, category: Category) -> Result<PathBuf>;
}

/// CSV file exporter with the dated per-category directory layout.
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl Exporter for CsvExporter {
    fn export(&self, table: &Table, category: Category) -> Result<PathBuf> {
        let dir = self
            .out_dir
            .join(Local::now().format("%d-%m-%Y").to_string())
            .join(category.key());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;

        let path = dir.join("indicadores-fundamentalistas.csv");
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        let mut header = Vec::with_capacity(table.columns.len() + 1);
        header.push(SYMBOL_COLUMN.to_string());
        header.extend(table.columns.iter().cloned());
        writer
            .write_record(&header)
            .context("failed to write CSV header")?;

        for row in &table.rows {
            let mut record = Vec::with_capacity(row.cells.len() + 1);
            record.push(row.symbol.clone());
            record.extend(row.cells.iter().map(|cell| cell.render()));
            writer
                .write_record(&record)
                .with_context(|| format!("failed to write row for {}", row.symbol))?;
        }

        writer.flush().context("failed to flush CSV output")?;
        info!(path = %path.display(), rows = table.len(), "table exported");
        Ok(path)
    }
}
