// =============================================================================
// Larry Williams Setup
// =============================================================================
//
// Two-legged entry test on the most recent bars:
//   1. Trend filter  : the latest close sits above a long simple moving
//                      average (always simple, regardless of the flag).
//   2. Momentum leg  : the close crosses up through the short average
//                      between the last two bars
//                      (close[-2] < avg[-2] and close[-1] > avg[-1]).
//
// The `exponential` flag selects the short average's flavour only.

use serde::{Deserialize, Serialize};

use crate::indicators::{at_bar, ema, sma};

fn default_short_period() -> usize {
    9
}

fn default_filter_ma() -> usize {
    21
}

fn default_exponential() -> bool {
    true
}

/// Parameters for the Larry Williams setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LarryWilliamsParams {
    #[serde(default = "default_short_period")]
    pub short_period: usize,

    /// Period of the simple moving average used as the trend filter.
    #[serde(default = "default_filter_ma")]
    pub filter_ma: usize,

    /// Exponential short average when true; the filter average is always
    /// simple.
    #[serde(default = "default_exponential")]
    pub exponential: bool,
}

impl Default for LarryWilliamsParams {
    fn default() -> Self {
        Self {
            short_period: default_short_period(),
            filter_ma: default_filter_ma(),
            exponential: default_exponential(),
        }
    }
}

/// True iff both legs of the setup hold on the most recent bar.
///
/// Any undefined average value (window longer than the available history)
/// yields `false`, never a fault.
pub fn evaluate(closes: &[f64], params: &LarryWilliamsParams) -> bool {
    let n = closes.len();
    if n < 2 {
        return false;
    }

    // Trend filter: latest close above the long simple average.
    let filter = sma::rolling_mean(closes, params.filter_ma);
    let filter_last = match at_bar(&filter, params.filter_ma.saturating_sub(1), n - 1) {
        Some(v) => v,
        None => return false,
    };
    if closes[n - 1] <= filter_last {
        return false;
    }

    // Momentum leg: close crosses up through the short average.
    let (short, short_off) = if params.exponential {
        (ema::weighted_mean(closes, params.short_period), 0)
    } else {
        (
            sma::rolling_mean(closes, params.short_period),
            params.short_period.saturating_sub(1),
        )
    };

    match (
        at_bar(&short, short_off, n - 2),
        at_bar(&short, short_off, n - 1),
    ) {
        (Some(prev_avg), Some(last_avg)) => {
            closes[n - 2] < prev_avg && closes[n - 1] > last_avg
        }
        _ => false,
    }
}
