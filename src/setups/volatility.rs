// =============================================================================
// Annualised Volatility — log-return standard deviation, 252 trading days
// =============================================================================
//
//   r_t   = ln(close_t / close_{t-1})
//   sigma = sample stddev of r (n-1 denominator)
//   vol%  = sigma * sqrt(252) * 100
//
// Pairs with a non-positive or non-finite close produce no return (the
// undefined points are dropped, as a feed gap would be). Fewer than two
// usable returns is a hard fault: a volatility of 0 or NaN would silently
// poison the screening output.

use crate::error::{Result, ScreenError};

/// Trading days per year used for annualisation.
const TRADING_DAYS: f64 = 252.0;

/// Minimum number of valid log returns for a sample standard deviation.
const MIN_RETURNS: usize = 2;

/// Annualised volatility of a close series, as a percentage.
///
/// Fails with `InsufficientHistory` when fewer than [`MIN_RETURNS`] valid log
/// returns can be formed.
pub fn annualized(symbol: &str, closes: &[f64]) -> Result<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0].is_finite() && w[1].is_finite() && w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect();

    if returns.len() < MIN_RETURNS {
        return Err(ScreenError::insufficient_history(
            symbol,
            MIN_RETURNS,
            returns.len(),
        ));
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let daily = variance.sqrt();

    Ok(daily * TRADING_DAYS.sqrt() * 100.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_form_oscillating_series() {
        // Close = [100, 101, 100, 101] => returns [r, -r, r] with r = ln(1.01).
        // mean = r/3, deviations {2r/3, -4r/3, 2r/3}, sample variance = 4r²/3,
        // stddev = 2r/sqrt(3).
        let vol = annualized("TEST", &[100.0, 101.0, 100.0, 101.0]).unwrap();
        let r = (1.01f64).ln();
        let expected = 2.0 * r / 3.0f64.sqrt() * 252.0f64.sqrt() * 100.0;
        assert!(
            (vol - expected).abs() < 1e-9,
            "got {vol}, expected {expected}"
        );
        // Sanity: the closed form lands near 18.24 %.
        assert!((vol - 18.239).abs() < 0.01);
    }

    #[test]
    fn constant_series_has_zero_volatility() {
        let vol = annualized("TEST", &[50.0; 10]).unwrap();
        assert!(vol.abs() < 1e-12);
    }

    #[test]
    fn too_short_history_faults() {
        let err = annualized("MXRF11", &[100.0, 101.0]).unwrap_err();
        match err {
            ScreenError::InsufficientHistory {
                symbol,
                required,
                available,
            } => {
                assert_eq!(symbol, "MXRF11");
                assert_eq!(required, 2);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_series_faults() {
        assert!(annualized("X", &[]).is_err());
        assert!(annualized("X", &[100.0]).is_err());
    }

    #[test]
    fn non_positive_closes_are_dropped() {
        // The zero close invalidates both pairs that touch it; the remaining
        // pairs still produce enough returns.
        let closes = [100.0, 0.0, 100.0, 101.0, 100.0, 101.0];
        let with_gap = annualized("TEST", &closes).unwrap();
        let without_gap = annualized("TEST", &[100.0, 101.0, 100.0, 101.0]).unwrap();
        assert!(with_gap.is_finite());
        // The gap removes two pairs but the surviving returns are the same
        // oscillation, so the estimates stay in the same range.
        assert!((with_gap - without_gap).abs() < with_gap);
    }

    #[test]
    fn all_invalid_closes_fault_rather_than_nan() {
        assert!(annualized("X", &[0.0, -1.0, 0.0]).is_err());
    }
}
