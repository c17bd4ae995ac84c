pub mod yahoo;

pub use yahoo::YahooClient;

use chrono::NaiveDate;
use std::fmt;

use crate::models::{LookbackPeriod, PriceSeries};
use crate::Result;

/// Which slice of daily history to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchWindow {
    /// Trailing window ending today (the dashboard's "3 years")
    Lookback(LookbackPeriod),
    /// Everything from a fixed start date (offline training)
    Since(NaiveDate),
}

impl Default for FetchWindow {
    fn default() -> Self {
        FetchWindow::Lookback(LookbackPeriod::default())
    }
}

impl fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchWindow::Lookback(period) => write!(f, "{}", period),
            FetchWindow::Since(date) => write!(f, "since {}", date),
        }
    }
}

/// Source of daily OHLCV history
///
/// Implementations return bars already normalized into `PriceBar`s and fail with
/// `Error::DataUnavailable` when the source has no rows for the ticker/window.
#[allow(async_fn_in_trait)]
pub trait MarketDataProvider {
    async fn fetch_daily_bars(&self, ticker: &str, window: FetchWindow) -> Result<PriceSeries>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
