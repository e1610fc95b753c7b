// =============================================================================
// Screening Error Taxonomy
// =============================================================================
//
// Typed faults for the screening engine. Every variant names the offending
// column and/or symbol and the rule that was violated, so an operator can
// trace a failed batch back to a single scraped cell.
//
// Batch-stage faults (normalisation, filtering, ranking) abort the whole run;
// per-symbol faults (setup evaluation) are caught by the pipeline and surfaced
// through the observer without blocking the remaining symbols.

use thiserror::Error;

/// Errors raised by the screening core.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// A scraped string could not be converted to the expected numeric kind
    /// after locale cleanup.
    #[error("malformed value in column '{column}' for {symbol}: {raw:?}")]
    MalformedValue {
        column: String,
        symbol: String,
        raw: String,
    },

    /// A scoring column cannot be normalised without producing inf/NaN.
    #[error("degenerate criterion '{column}': {reason}")]
    DegenerateCriterion { column: String, reason: String },

    /// A filter or criterion references a column the table does not carry
    /// as numeric data.
    #[error("unknown or non-numeric column '{column}' referenced by configuration")]
    UnknownColumn { column: String },

    /// A price series is too short for the requested computation.
    #[error("insufficient history for {symbol}: need {required} valid log returns, have {available}")]
    InsufficientHistory {
        symbol: String,
        required: usize,
        available: usize,
    },
}

impl ScreenError {
    /// Creates a malformed-value error.
    pub fn malformed(
        column: impl Into<String>,
        symbol: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self::MalformedValue {
            column: column.into(),
            symbol: symbol.into(),
            raw: raw.into(),
        }
    }

    /// Creates a degenerate-criterion error.
    pub fn degenerate(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DegenerateCriterion {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown-column error.
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    /// Creates an insufficient-history error.
    pub fn insufficient_history(
        symbol: impl Into<String>,
        required: usize,
        available: usize,
    ) -> Self {
        Self::InsufficientHistory {
            symbol: symbol.into(),
            required,
            available,
        }
    }

    /// True for faults scoped to a single symbol rather than the whole batch.
    #[must_use]
    pub fn is_per_symbol(&self) -> bool {
        matches!(self, Self::InsufficientHistory { .. })
    }
}

/// Result type alias for screening operations.
pub type Result<T> = std::result::Result<T, ScreenError>;
