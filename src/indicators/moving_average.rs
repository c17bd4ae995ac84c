/// Trailing SMA at every index
///
/// Index `i` holds the mean of `prices[i + 1 - window..=i]`. Positions before the
/// window fills are `None` rather than zero.
pub fn rolling_sma(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if window == 0 || prices.len() < window {
        return out;
    }

    let mut sum: f64 = prices[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);

    for i in window..prices.len() {
        sum += prices[i] - prices[i - window];
        out[i] = Some(sum / window as f64);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trailing_mean(prices: &[f64], window: usize) -> f64 {
        prices[prices.len() - window..].iter().sum::<f64>() / window as f64
    }

    #[test]
    fn test_rolling_sma_full_window() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let ma = rolling_sma(&prices, 5);
        assert_eq!(ma[4], Some(104.0));
        assert!(ma[..4].iter().all(Option::is_none));
    }

    #[test]
    fn test_rolling_sma_zero_window() {
        assert_eq!(rolling_sma(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn test_rolling_sma_window_two() {
        let prices = vec![100.0, 102.0, 101.0, 105.0, 110.0];
        let ma = rolling_sma(&prices, 2);

        assert_eq!(ma[0], None);
        assert_eq!(ma[1], Some(101.0));
        assert_eq!(ma[4], Some(107.5));
    }

    #[test]
    fn test_rolling_sma_matches_trailing_mean() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let ma = rolling_sma(&prices, 20);

        for (i, value) in ma.iter().enumerate() {
            if i < 19 {
                assert!(value.is_none(), "index {} should be undefined", i);
            } else {
                let expected = trailing_mean(&prices[..=i], 20);
                assert!((value.unwrap() - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_rolling_sma_short_input() {
        let ma = rolling_sma(&[1.0, 2.0, 3.0], 5);
        assert_eq!(ma, vec![None, None, None]);
        assert!(rolling_sma(&[], 3).is_empty());
    }
}
