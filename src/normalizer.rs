// =============================================================================
// Value Normaliser — Brazilian-locale scraped text to numeric cells
// =============================================================================
//
// The source pages format numbers as "1.234,56", prefix currencies with "R$",
// suffix percentages with "%", and abbreviate large liquidity figures with
// " K" / " M". A bare "-" (or an empty cell) is the pages' no-data marker.
//
// Rules:
//   Float   : strip "R$", "%" and spaces; "." is a thousands separator and is
//             removed; "," becomes the decimal point; a leading minus sign is
//             preserved. "1.234,56" => 1234.56, "-12,34%" => -12.34.
//   Integer : strip "R$ ", "." and ","; then the literal abbreviation rule of
//             the source pages applies: " K" appends one "0" and " M" appends
//             four "0"s. "12 K" => 120, "R$ 1.234,56 K" => 1234560.
//   Sentinel: the exact string "-" (or "") becomes zero and is flagged as a
//             substitution so downstream reporting can count the zero-fills.
//
// Anything that still fails to parse after cleanup is malformed; the caller
// attaches the column and symbol and rejects the batch.

use crate::types::Cell;

/// Numeric kind a scraped column is normalised to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Float,
    Integer,
}

/// A successfully normalised cell, with a flag marking sentinel zero-fills.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub cell: Cell,
    pub substituted: bool,
}

/// True when the raw text is the pages' no-data marker.
pub fn is_sentinel(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "-"
}

/// Normalise one scraped string to the requested numeric kind.
///
/// Returns `None` when the text cannot be parsed after cleanup; the caller
/// decides how the failure propagates.
pub fn normalize(raw: &str, kind: NumericKind) -> Option<Normalized> {
    if is_sentinel(raw) {
        let cell = match kind {
            NumericKind::Float => Cell::Float(0.0),
            NumericKind::Integer => Cell::Integer(0),
        };
        return Some(Normalized {
            cell,
            substituted: true,
        });
    }

    match kind {
        NumericKind::Float => clean_float(raw).map(|v| Normalized {
            cell: Cell::Float(v),
            substituted: false,
        }),
        NumericKind::Integer => clean_integer(raw).map(|v| Normalized {
            cell: Cell::Integer(v),
            substituted: false,
        }),
    }
}

fn clean_float(raw: &str) -> Option<f64> {
    let cleaned = raw
        .trim()
        .replace("R$", "")
        .replace('%', "")
        .replace(' ', "")
        // Thousands separator first, then the decimal comma.
        .replace('.', "")
        .replace(',', ".");

    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then_some(value)
}

fn clean_integer(raw: &str) -> Option<i64> {
    let cleaned = raw
        .trim()
        .replace("R$ ", "")
        .replace("R$", "")
        .replace('.', "")
        .replace(',', "")
        // Literal abbreviation rule of the source pages.
        .replace(" K", "0")
        .replace(" M", "0000")
        .replace(' ', "");

    cleaned.parse().ok()
}
