use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::indicators::rolling_sma;
use crate::models::{ChartPoint, PriceSeries};
use crate::Result;

/// Configuration for the moving-average crossover
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrossoverConfig {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
        }
    }
}

impl CrossoverConfig {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self> {
        let config = Self {
            short_window,
            long_window,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.short_window == 0 {
            return Err(Error::InvalidConfig(
                "short moving-average window must be positive".to_string(),
            ));
        }
        if self.short_window >= self.long_window {
            return Err(Error::InvalidConfig(format!(
                "short window ({}) must be smaller than long window ({})",
                self.short_window, self.long_window
            )));
        }
        Ok(())
    }

    /// Bars needed so both averages exist on the last two days
    ///
    /// # Example
    /// ```
    /// use stockcast::strategy::signals::CrossoverConfig;
    ///
    /// assert_eq!(CrossoverConfig::default().min_bars_required(), 51);
    /// ```
    pub fn min_bars_required(&self) -> usize {
        self.long_window + 1
    }
}

/// A price series with short and long moving-average columns appended
#[derive(Debug, Clone)]
pub struct AnalyzedSeries {
    series: PriceSeries,
    config: CrossoverConfig,
    ma_short: Vec<Option<f64>>,
    ma_long: Vec<Option<f64>>,
}

impl AnalyzedSeries {
    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn config(&self) -> &CrossoverConfig {
        &self.config
    }

    /// (short, long) averages at `index`, if both are defined
    pub fn averages_at(&self, index: usize) -> Option<(f64, f64)> {
        let short = (*self.ma_short.get(index)?)?;
        let long = (*self.ma_long.get(index)?)?;
        Some((short, long))
    }

    /// Close, short MA and long MA aligned by date
    pub fn chart(&self) -> Vec<ChartPoint> {
        self.series
            .bars()
            .iter()
            .zip(self.ma_short.iter().zip(self.ma_long.iter()))
            .map(|(bar, (&ma_short, &ma_long))| ChartPoint {
                date: bar.date,
                close: bar.close,
                ma_short,
                ma_long,
            })
            .collect()
    }
}

/// Append trailing SMA columns for both windows
pub fn compute_moving_averages(series: &PriceSeries, config: &CrossoverConfig) -> AnalyzedSeries {
    let closes = series.closes();

    AnalyzedSeries {
        series: series.clone(),
        config: *config,
        ma_short: rolling_sma(&closes, config.short_window),
        ma_long: rolling_sma(&closes, config.long_window),
    }
}
