// =============================================================================
// Moving-Average Crossover Setup
// =============================================================================
//
// Bullish crossover: the short-horizon average moves from at-or-below the
// long-horizon average to strictly above it between two consecutive bars.
//
// Two entry points:
//   - `evaluate`         : single-bar detector, confirms the transition on the
//                          most recent bar only.
//   - `latest_crossover` : history scan, returns the most recent bar anywhere
//                          in the series where the transition occurred.

use serde::{Deserialize, Serialize};

use crate::indicators::{at_bar, ema, sma};

fn default_short_period() -> usize {
    9
}

fn default_long_period() -> usize {
    21
}

fn default_exponential() -> bool {
    true
}

/// Parameters for the crossover setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossoverParams {
    #[serde(default = "default_short_period")]
    pub short_period: usize,

    #[serde(default = "default_long_period")]
    pub long_period: usize,

    /// Exponential averages when true, simple averages otherwise.
    #[serde(default = "default_exponential")]
    pub exponential: bool,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        Self {
            short_period: default_short_period(),
            long_period: default_long_period(),
            exponential: default_exponential(),
        }
    }
}

/// Average series plus its alignment offset against the close index.
fn average(closes: &[f64], period: usize, exponential: bool) -> (Vec<f64>, usize) {
    if exponential {
        (ema::weighted_mean(closes, period), 0)
    } else {
        (sma::rolling_mean(closes, period), period.saturating_sub(1))
    }
}

/// The bullish transition rule between two consecutive bars.
fn bullish_transition(prev_short: f64, prev_long: f64, last_short: f64, last_long: f64) -> bool {
    prev_short <= prev_long && last_short > last_long
}

/// True iff a bullish crossover is confirmed on the most recent bar.
///
/// Any undefined average value on the last two bars (window longer than the
/// available history) yields `false`, never a fault.
pub fn evaluate(closes: &[f64], params: &CrossoverParams) -> bool {
    let n = closes.len();
    if n < 2 {
        return false;
    }

    let (short, short_off) = average(closes, params.short_period, params.exponential);
    let (long, long_off) = average(closes, params.long_period, params.exponential);

    let values = (
        at_bar(&short, short_off, n - 2),
        at_bar(&long, long_off, n - 2),
        at_bar(&short, short_off, n - 1),
        at_bar(&long, long_off, n - 1),
    );

    match values {
        (Some(ps), Some(pl), Some(ls), Some(ll)) => bullish_transition(ps, pl, ls, ll),
        _ => false,
    }
}

/// Scan the whole series and return the most recent bar index where a bullish
/// crossover occurred, or `None` when it never does.
pub fn latest_crossover(closes: &[f64], params: &CrossoverParams) -> Option<usize> {
    let n = closes.len();
    if n < 2 {
        return None;
    }

    let (short, short_off) = average(closes, params.short_period, params.exponential);
    let (long, long_off) = average(closes, params.long_period, params.exponential);

    for bar in (1..n).rev() {
        let values = (
            at_bar(&short, short_off, bar - 1),
            at_bar(&long, long_off, bar - 1),
            at_bar(&short, short_off, bar),
            at_bar(&long, long_off, bar),
        );
        if let (Some(ps), Some(pl), Some(ls), Some(ll)) = values {
            if bullish_transition(ps, pl, ls, ll) {
                return Some(bar);
            }
        }
    }
    None
}
