// =============================================================================
// Screening Observer — injected progress reporting
// =============================================================================
//
// The pipeline reports progress through this trait instead of printing.
// The default implementation forwards to `tracing`; tests plug in recording
// stubs, and an embedding application can route events to its own UI.

use tracing::{debug, info, warn};

use crate::error::ScreenError;

/// Receives progress events from the screening pipeline. All methods have
/// empty default bodies so implementors only override what they care about.
pub trait ScreenObserver {
    /// A pipeline stage is starting over `rows` rows.
    fn stage_started(&self, _stage: &str, _rows: usize) {}

    /// `count` sentinel cells in `column` were zero-filled during
    /// normalisation.
    fn sentinel_substitutions(&self, _column: &str, _count: usize) {}

    /// A row was removed by a threshold bound or enrichment pre-filter.
    fn row_rejected(&self, _symbol: &str, _reason: &str) {}

    /// A per-symbol setup fault (the batch continues without this value).
    fn symbol_fault(&self, _symbol: &str, _error: &ScreenError) {}
}

/// Default observer: structured log lines via `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ScreenObserver for TracingObserver {
    fn stage_started(&self, stage: &str, rows: usize) {
        info!(stage, rows, "screening stage started");
    }

    fn sentinel_substitutions(&self, column: &str, count: usize) {
        if count > 0 {
            warn!(column, count, "no-data sentinels zero-filled");
        }
    }

    fn row_rejected(&self, symbol: &str, reason: &str) {
        debug!(symbol, reason, "row rejected");
    }

    fn symbol_fault(&self, symbol: &str, error: &ScreenError) {
        warn!(symbol, error = %error, "setup evaluation fault");
    }
}

/// Observer that swallows every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ScreenObserver for NullObserver {}
