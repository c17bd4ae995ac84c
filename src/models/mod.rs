use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::Result;

/// One daily OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Daily bars for one ticker, strictly increasing by date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "UncheckedSeries")]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

#[derive(Deserialize)]
struct UncheckedSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl TryFrom<UncheckedSeries> for PriceSeries {
    type Error = Error;

    fn try_from(raw: UncheckedSeries) -> Result<Self> {
        PriceSeries::new(raw.ticker, raw.bars)
    }
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate dates
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self> {
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(Error::UnorderedBars { index: i + 1 });
            }
        }

        Ok(Self {
            ticker: ticker.into(),
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn previous_close(&self) -> Option<f64> {
        self.bars.len().checked_sub(2).map(|i| self.bars[i].close)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Latest close and its change against the prior session
    pub fn price_change(&self) -> Option<PriceChange> {
        let current = self.last_close()?;
        Some(PriceChange::new(current, self.previous_close()))
    }
}

/// Current price with its day-over-day change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceChange {
    pub current: f64,
    pub previous: Option<f64>,
    pub change: Option<f64>,
    pub percent: Option<f64>,
}

impl PriceChange {
    pub fn new(current: f64, previous: Option<f64>) -> Self {
        let change = previous.map(|p| current - p);
        let percent = previous.zip(change).map(|(p, c)| c / p * 100.0);

        Self {
            current,
            previous,
            change,
            percent,
        }
    }
}

/// How far back to request history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LookbackPeriod {
    Days(u32),
    Months(u32),
    Years(u32),
    Max,
}

impl Default for LookbackPeriod {
    fn default() -> Self {
        LookbackPeriod::Years(3)
    }
}

impl LookbackPeriod {
    /// First calendar day covered when looking back from `today`; `None` means all history
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        match *self {
            LookbackPeriod::Days(n) => today.checked_sub_signed(Duration::days(n as i64)),
            LookbackPeriod::Months(n) => today.checked_sub_months(Months::new(n)),
            LookbackPeriod::Years(n) => today.checked_sub_months(Months::new(n * 12)),
            LookbackPeriod::Max => None,
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookbackPeriod::Days(n) => write!(f, "{}d", n),
            LookbackPeriod::Months(n) => write!(f, "{}mo", n),
            LookbackPeriod::Years(n) => write!(f, "{}y", n),
            LookbackPeriod::Max => write!(f, "max"),
        }
    }
}

impl FromStr for LookbackPeriod {
    type Err = Error;

    /// Parses `5d`, `6mo`, `3y` or `max`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s == "max" {
            return Ok(LookbackPeriod::Max);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidPeriod(s.clone()))?;
        let (digits, unit) = s.split_at(split);

        let n: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidPeriod(s.clone()))?;
        if n == 0 {
            return Err(Error::InvalidPeriod(s.clone()));
        }

        match unit {
            "d" => Ok(LookbackPeriod::Days(n)),
            "mo" => Ok(LookbackPeriod::Months(n)),
            "y" => Ok(LookbackPeriod::Years(n)),
            _ => Err(Error::InvalidPeriod(s.clone())),
        }
    }
}

/// Trading signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn headline(&self) -> &'static str {
        match self {
            Signal::Buy => "Uptrend Started",
            Signal::Sell => "Downtrend Started",
            Signal::Hold => "No Clear Trend",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(label)
    }
}

/// Why the crossover engine produced its signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalReason {
    GoldenCross,
    DeathCross,
    NoCrossover,
    InsufficientHistory,
}

/// Signal as shown to the user, plus the reason behind it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignalReading {
    pub signal: Signal,
    pub reason: SignalReason,
}

/// One date-aligned row of the price chart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
}
