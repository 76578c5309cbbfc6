//! Stateless technical indicators.
//!
//! All functions operate on a full price history plus a bar index and a
//! lookback, so callers can evaluate any bar of a path without copying
//! windows around. Windows clamp to the start of the series; degenerate
//! inputs produce neutral values rather than panicking.

/// Returns the trailing window ending at `index` (inclusive), at most
/// `lookback` bars long.
fn window(prices: &[f64], index: usize, lookback: usize) -> &[f64] {
    let end = (index + 1).min(prices.len());
    let start = end.saturating_sub(lookback);
    &prices[start..end]
}

/// Simple moving average of the `lookback` bars ending at `index`.
///
/// Returns 0.0 for an empty series.
#[must_use]
pub fn sma(prices: &[f64], index: usize, lookback: usize) -> f64 {
    let w = window(prices, index, lookback);
    if w.is_empty() {
        return 0.0;
    }
    w.iter().sum::<f64>() / w.len() as f64
}

/// Population standard deviation of the `lookback` bars ending at `index`.
#[must_use]
pub fn std_dev(prices: &[f64], index: usize, lookback: usize) -> f64 {
    let w = window(prices, index, lookback);
    if w.len() < 2 {
        return 0.0;
    }
    let mean = w.iter().sum::<f64>() / w.len() as f64;
    let variance = w.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / w.len() as f64;
    variance.sqrt()
}

/// Relative Strength Index over the last `lookback` price changes.
///
/// Needs `lookback + 1` samples; with less history the neutral value 50
/// is returned. An all-gain window returns 100, an all-loss window 0.
#[must_use]
pub fn rsi(prices: &[f64], index: usize, lookback: usize) -> f64 {
    if lookback == 0 || index + 1 < lookback + 1 || index >= prices.len() {
        return 50.0;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in (index + 1 - lookback)..=index {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses += -change;
        }
    }

    let avg_gain = gains / lookback as f64;
    let avg_loss = losses / lookback as f64;

    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Bollinger Bands: `(upper, middle, lower)` where the middle band is the
/// SMA and the outer bands sit `k` standard deviations away.
#[must_use]
pub fn bollinger_bands(prices: &[f64], index: usize, lookback: usize, k: f64) -> (f64, f64, f64) {
    let mid = sma(prices, index, lookback);
    let sigma = std_dev(prices, index, lookback);
    (mid + k * sigma, mid, mid - k * sigma)
}

/// Highest price in the `lookback` bars strictly before `index`.
///
/// Returns `None` when no prior bars exist.
#[must_use]
pub fn rolling_high(prices: &[f64], index: usize, lookback: usize) -> Option<f64> {
    if index == 0 || lookback == 0 {
        return None;
    }
    let start = index.saturating_sub(lookback);
    prices[start..index]
        .iter()
        .copied()
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |m| m.max(p))))
}

/// Lowest price in the `lookback` bars strictly before `index`.
///
/// Returns `None` when no prior bars exist.
#[must_use]
pub fn rolling_low(prices: &[f64], index: usize, lookback: usize) -> Option<f64> {
    if index == 0 || lookback == 0 {
        return None;
    }
    let start = index.saturating_sub(lookback);
    prices[start..index]
        .iter()
        .copied()
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |m| m.min(p))))
}

/// Z-score of the price at `index` against its trailing window.
///
/// Returns 0.0 when the window standard deviation is zero.
#[must_use]
pub fn z_score(prices: &[f64], index: usize, lookback: usize) -> f64 {
    if index >= prices.len() {
        return 0.0;
    }
    let sigma = std_dev(prices, index, lookback);
    if sigma == 0.0 {
        return 0.0;
    }
    (prices[index] - sma(prices, index, lookback)) / sigma
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_full_window() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sma(&prices, 4, 5), 3.0);
        assert_eq!(sma(&prices, 4, 3), 4.0);
    }

    #[test]
    fn test_sma_clamps_to_start() {
        let prices = [2.0, 4.0];
        assert_eq!(sma(&prices, 1, 10), 3.0);
    }

    #[test]
    fn test_sma_empty() {
        assert_eq!(sma(&[], 0, 5), 0.0);
    }

    #[test]
    fn test_std_dev_constant_series() {
        let prices = [5.0; 10];
        assert_eq!(std_dev(&prices, 9, 10), 0.0);
    }

    #[test]
    fn test_std_dev_known_value() {
        // Population stdev of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&prices, 7, 8) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_insufficient_history_is_neutral() {
        let prices = [100.0, 101.0, 102.0];
        assert_eq!(rsi(&prices, 2, 14), 50.0);
    }

    #[test]
    fn test_rsi_all_gains() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + f64::from(i)).collect();
        assert_eq!(rsi(&prices, 19, 14), 100.0);
    }

    #[test]
    fn test_rsi_all_losses() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - f64::from(i)).collect();
        assert_eq!(rsi(&prices, 19, 14), 0.0);
    }

    #[test]
    fn test_rsi_balanced_is_fifty() {
        // Alternating +1/-1 changes: equal average gain and loss.
        let mut prices = vec![100.0];
        for i in 0..20 {
            let last = *prices.last().unwrap();
            prices.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        assert!((rsi(&prices, 20, 14) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_band_ordering() {
        let prices = [98.0, 101.0, 99.0, 102.0, 100.0, 97.0, 103.0, 100.0];
        let (upper, mid, lower) = bollinger_bands(&prices, 7, 8, 2.0);
        assert!(upper > mid);
        assert!(mid > lower);
        assert!((upper - mid - (mid - lower)).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_high_low_exclude_current() {
        let prices = [1.0, 5.0, 3.0, 10.0];
        // Window for index 3 is bars 0..3, excluding the 10.0 itself.
        assert_eq!(rolling_high(&prices, 3, 3), Some(5.0));
        assert_eq!(rolling_low(&prices, 3, 3), Some(1.0));
    }

    #[test]
    fn test_rolling_high_no_history() {
        let prices = [1.0, 2.0];
        assert_eq!(rolling_high(&prices, 0, 5), None);
    }

    #[test]
    fn test_z_score_zero_variance() {
        let prices = [5.0; 10];
        assert_eq!(z_score(&prices, 9, 10), 0.0);
    }

    #[test]
    fn test_z_score_sign() {
        let prices = [100.0, 100.0, 100.0, 100.0, 110.0];
        assert!(z_score(&prices, 4, 5) > 0.0);

        let prices = [100.0, 100.0, 100.0, 100.0, 90.0];
        assert!(z_score(&prices, 4, 5) < 0.0);
    }
}
