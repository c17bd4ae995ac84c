//! Single-feature linear regression: close(t) → close(t+1)
//!
//! Fitted with the closed-form Ordinary Least Squares solution
//! `slope = cov(x, y) / var(x)`, `intercept = mean(y) - slope * mean(x)`.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::PriceSeries;
use crate::Result;

/// (close[i], close[i + 1]) for every bar that has a known next close
pub fn training_pairs(series: &PriceSeries) -> Vec<(f64, f64)> {
    series
        .bars()
        .windows(2)
        .map(|w| (w[0].close, w[1].close))
        .collect()
}

/// Fitted linear mapping from today's close to tomorrow's close
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
}

impl RegressionModel {
    /// Fit on every (close, next close) pair of the series
    pub fn fit(series: &PriceSeries) -> Result<Self> {
        let pairs = training_pairs(series);
        let model = Self::fit_pairs(&pairs)?;

        tracing::debug!(
            "Fitted {} on {} pairs: slope={:.6}, intercept={:.6}, r2={:.4}",
            series.ticker(),
            pairs.len(),
            model.slope,
            model.intercept,
            model.r_squared(&pairs)
        );

        Ok(model)
    }

    /// Ordinary least squares over explicit (feature, target) pairs
    pub fn fit_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        if pairs.len() < 2 {
            return Err(Error::InsufficientData { pairs: pairs.len() });
        }

        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (sxy, sxx) = pairs.iter().fold((0.0, 0.0), |(sxy, sxx), &(x, y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });

        // Constant feature: least squares leaves the slope at zero
        let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
        let intercept = mean_y - slope * mean_x;

        Ok(Self { slope, intercept })
    }

    /// Predict the next close. Inputs outside the training range are accepted as-is.
    pub fn predict(&self, current_close: f64) -> f64 {
        self.slope * current_close + self.intercept
    }

    pub fn mean_squared_error(&self, pairs: &[(f64, f64)]) -> f64 {
        if pairs.is_empty() {
            return 0.0;
        }
        pairs
            .iter()
            .map(|&(x, y)| (y - self.predict(x)).powi(2))
            .sum::<f64>()
            / pairs.len() as f64
    }

    /// Coefficient of determination on the given pairs
    pub fn r_squared(&self, pairs: &[(f64, f64)]) -> f64 {
        if pairs.is_empty() {
            return 0.0;
        }
        let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / pairs.len() as f64;
        let ss_tot: f64 = pairs.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
        let ss_res: f64 = pairs
            .iter()
            .map(|&(x, y)| (y - self.predict(x)).powi(2))
            .sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceBar;
    use chrono::{Duration, NaiveDate};

    fn create_test_series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect();
        PriceSeries::new("AAPL", bars).unwrap()
    }

    #[test]
    fn test_training_pairs_drop_last_bar() {
        let series = create_test_series(&[100.0, 102.0, 101.0, 105.0, 110.0]);
        let pairs = training_pairs(&series);

        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0], (100.0, 102.0));
        assert_eq!(pairs[3], (105.0, 110.0));
    }

    #[test]
    fn test_fit_exact_line() {
        // y = 2x + 1
        let pairs = vec![(1.0, 3.0), (2.0, 5.0), (3.0, 7.0), (4.0, 9.0)];
        let model = RegressionModel::fit_pairs(&pairs).unwrap();

        assert!((model.slope - 2.0).abs() < 1e-12);
        assert!((model.intercept - 1.0).abs() < 1e-12);
        assert!((model.predict(10.0) - 21.0).abs() < 1e-9);
        assert!((model.r_squared(&pairs) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_geometric_series() {
        // Each close is 1% above the last: next = 1.01 * close
        let closes: Vec<f64> = (0..30).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let model = RegressionModel::fit(&create_test_series(&closes)).unwrap();

        assert!((model.slope - 1.01).abs() < 1e-9);
        assert!(model.intercept.abs() < 1e-6);
    }

    #[test]
    fn test_one_pair_is_insufficient() {
        let series = create_test_series(&[100.0, 101.0]);
        let result = RegressionModel::fit(&series);
        assert!(matches!(result, Err(Error::InsufficientData { pairs: 1 })));
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        let series = PriceSeries::new("AAPL", Vec::new()).unwrap();
        assert!(matches!(
            RegressionModel::fit(&series),
            Err(Error::InsufficientData { pairs: 0 })
        ));
    }

    #[test]
    fn test_constant_feature_predicts_mean() {
        let pairs = vec![(50.0, 49.0), (50.0, 51.0), (50.0, 53.0)];
        let model = RegressionModel::fit_pairs(&pairs).unwrap();

        assert_eq!(model.slope, 0.0);
        assert!((model.intercept - 51.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_beats_same_price_baseline() {
        let closes = [100.0, 102.0, 101.0, 105.0, 110.0, 108.0, 111.0, 115.0, 113.0];
        let pairs = training_pairs(&create_test_series(&closes));
        let model = RegressionModel::fit_pairs(&pairs).unwrap();
        let identity = RegressionModel {
            slope: 1.0,
            intercept: 0.0,
        };

        assert!(model.mean_squared_error(&pairs) <= identity.mean_squared_error(&pairs) + 1e-12);
    }

    #[test]
    fn test_predict_extrapolates_silently() {
        let model = RegressionModel {
            slope: 0.5,
            intercept: 10.0,
        };
        assert_eq!(model.predict(-100.0), -40.0);
        assert_eq!(model.predict(1e6), 500_010.0);
    }
}
