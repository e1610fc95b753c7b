// =============================================================================
// Setup Evaluators
// =============================================================================
//
// Technical setups computed per symbol from its price history:
// - Moving-average crossover (single-bar detector + history scan)
// - Larry Williams trend-filtered momentum entry
// - Annualised volatility estimate
//
// Each evaluator is a pure function of one series; there is no state and no
// cross-symbol dependency, so callers are free to fan the loop out.

pub mod crossover;
pub mod larry_williams;
pub mod volatility;

pub use crossover::CrossoverParams;
pub use larry_williams::LarryWilliamsParams;

use crate::error::ScreenError;
use crate::types::{PriceSeries, SignalReport};

/// Runs all setup evaluators for one symbol with a fixed parameter set.
#[derive(Debug, Clone, Default)]
pub struct SetupEngine {
    pub crossover: CrossoverParams,
    pub larry_williams: LarryWilliamsParams,
}

impl SetupEngine {
    pub fn new(crossover: CrossoverParams, larry_williams: LarryWilliamsParams) -> Self {
        Self {
            crossover,
            larry_williams,
        }
    }

    /// Evaluate every setup against one price series.
    ///
    /// The moving-average signals degrade to `false` on short histories; the
    /// volatility estimate instead faults, and that fault is returned
    /// alongside the report so the caller can surface it without losing the
    /// boolean signals. Faults here are always scoped to this symbol.
    pub fn evaluate(&self, series: &PriceSeries) -> (SignalReport, Option<ScreenError>) {
        let closes = series.closes();

        let crossover = crossover::evaluate(&closes, &self.crossover);
        let larry_williams = larry_williams::evaluate(&closes, &self.larry_williams);

        let (annual_volatility, fault) = match volatility::annualized(&series.symbol, &closes) {
            Ok(v) => (Some(v), None),
            Err(e) => (None, Some(e)),
        };

        (
            SignalReport {
                larry_williams,
                crossover,
                annual_volatility,
            },
            fault,
        )
    }
}
