// =============================================================================
// Moving Average Indicators
// =============================================================================
//
// Pure, side-effect-free moving averages shared by the setup evaluators.
// `rolling_mean` output is compacted (element `k` maps to close index
// `period - 1 + k`); `weighted_mean` has one output per input bar. The
// `at_bar` helper resolves either representation against an absolute bar
// index so evaluators can align averages with the raw close series.

pub mod ema;
pub mod sma;

/// Value of an average series at absolute close index `bar`, given the
/// series' alignment offset (`period - 1` for `rolling_mean`, `0` for
/// `weighted_mean`). `None` when the average is not defined at that bar.
pub fn at_bar(series: &[f64], offset: usize, bar: usize) -> Option<f64> {
    let idx = bar.checked_sub(offset)?;
    series.get(idx).copied()
}
