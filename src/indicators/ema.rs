// =============================================================================
// Exponentially Weighted Moving Average (EWMA)
// =============================================================================
//
// Exponentially weighted mean with normalised decaying weights, the form the
// price feeds' analysis stacks compute for `span`-parameterised averages:
//
//   alpha = 2 / (span + 1)
//   y_t   = sum_{i=0..t} (1-alpha)^i * x_{t-i}  /  sum_{i=0..t} (1-alpha)^i
//
// Unlike a seeded recursive EMA there is no warm-up window: the average is
// defined from the very first bar (y_0 = x_0), which is what gives the setup
// evaluators a value on short histories.

/// Compute the exponentially weighted mean series for `closes` with the given
/// `span`. One output element per input bar.
///
/// # Edge cases
/// - `span == 0` => empty vec (alpha undefined)
/// - empty input => empty vec
/// - A non-finite close stops the series; downstream consumers should not
///   trust values past a broken input.
pub fn weighted_mean(closes: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || closes.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    // Incrementally maintained numerator / denominator:
    //   num_t = x_t + decay * num_{t-1}
    //   den_t = 1   + decay * den_{t-1}
    let mut result = Vec::with_capacity(closes.len());
    let mut num = 0.0_f64;
    let mut den = 0.0_f64;

    for &close in closes {
        num = close + decay * num;
        den = 1.0 + decay * den;

        let value = num / den;
        if !value.is_finite() {
            break;
        }
        result.push(value);
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ewma_empty_input() {
        assert!(weighted_mean(&[], 5).is_empty());
    }

    #[test]
    fn ewma_span_zero() {
        assert!(weighted_mean(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn ewma_first_value_is_first_close() {
        let out = weighted_mean(&[42.0, 43.0], 9);
        assert!((out[0] - 42.0).abs() < 1e-12);
    }

    #[test]
    fn ewma_known_values_span_three() {
        // span = 3 => alpha = 0.5, decay = 0.5.
        // y0 = 2
        // y1 = (4 + 0.5*2) / (1 + 0.5)        = 5 / 1.5   = 3.3333...
        // y2 = (8 + 0.5*4 + 0.25*2) / 1.75    = 10.5/1.75 = 6.0
        let out = weighted_mean(&[2.0, 4.0, 8.0], 3);
        assert_eq!(out.len(), 3);
        assert!((out[0] - 2.0).abs() < 1e-12);
        assert!((out[1] - 5.0 / 1.5).abs() < 1e-12);
        assert!((out[2] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn ewma_tracks_constant_series_exactly() {
        let out = weighted_mean(&[7.0; 50], 9);
        assert_eq!(out.len(), 50);
        for v in out {
            assert!((v - 7.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ewma_stops_at_nan() {
        let out = weighted_mean(&[1.0, 2.0, f64::NAN, 4.0], 3);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn ewma_converges_towards_recent_values() {
        // A long run of 10s followed by 20s should end close to 20.
        let mut closes = vec![10.0; 30];
        closes.extend(vec![20.0; 30]);
        let out = weighted_mean(&closes, 5);
        assert!(*out.last().unwrap() > 19.5);
    }
}
