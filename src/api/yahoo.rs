use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{FetchWindow, MarketDataProvider};
use crate::config::ProviderSettings;
use crate::error::Error;
use crate::models::{LookbackPeriod, PriceBar, PriceSeries};
use crate::Result;

const CHART_PATH: &str = "/v8/finance/chart";
const NOT_FOUND_CODE: &str = "Not Found";

/// Client for the Yahoo Finance chart API (daily bars)
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

// ============== Response Types ==============

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Deserialize, Default)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize, Default)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

// ============== Normalization ==============

fn column(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Flatten the nested timestamp + `indicators.quote[0]` columns into daily bars
///
/// Rows without a close are dropped; missing open/high/low fall back to the close and
/// missing volume to zero. Timestamps are shifted to exchange-local dates. When two
/// rows land on the same date the later one wins. Output is sorted by date.
fn flatten_chart(result: ChartResult) -> Vec<PriceBar> {
    let offset = result.meta.gmtoffset;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();

    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(close) = column(&quote.close, i) else {
            continue;
        };
        let Some(local) = ts
            .checked_add(offset)
            .and_then(|local_ts| DateTime::from_timestamp(local_ts, 0))
        else {
            tracing::warn!("Skipping bar with out-of-range timestamp {}", ts);
            continue;
        };
        let date = local.date_naive();

        by_date.insert(
            date,
            PriceBar {
                date,
                open: column(&quote.open, i).unwrap_or(close),
                high: column(&quote.high, i).unwrap_or(close),
                low: column(&quote.low, i).unwrap_or(close),
                close,
                volume: column(&quote.volume, i).unwrap_or(0.0),
            },
        );
    }

    by_date.into_values().collect()
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Query parameters for a daily chart request ending at `now`
fn query_params(window: FetchWindow, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
    let start = match window {
        FetchWindow::Lookback(LookbackPeriod::Max) => None,
        FetchWindow::Lookback(period) => period.start_date(now.date_naive()),
        FetchWindow::Since(date) => Some(date),
    };

    let mut params = vec![("interval", "1d".to_string())];
    match start {
        Some(date) => {
            params.push(("period1", unix_midnight(date).to_string()));
            params.push(("period2", now.timestamp().to_string()));
        }
        None => params.push(("range", "max".to_string())),
    }
    params.push(("events", "div,splits".to_string()));
    params
}

// ============== Implementation ==============

impl YahooClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}{}/{}", self.base_url, CHART_PATH, ticker)
    }

    /// Fetch daily bars for `ticker`
    ///
    /// Endpoint: GET /v8/finance/chart/{ticker}?interval=1d&period1=..&period2=..
    pub async fn fetch(&self, ticker: &str, window: FetchWindow) -> Result<PriceSeries> {
        let url = self.chart_url(ticker);
        let params = query_params(window, Utc::now());

        tracing::info!("Fetching daily bars for {} ({})", ticker, window);
        tracing::debug!("GET {} {:?}", url, params);

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let bars = parse_chart(&body, status, ticker, window)?;
        if bars.is_empty() {
            return Err(unavailable(ticker, window));
        }

        tracing::info!("Fetched {} daily bars for {}", bars.len(), ticker);
        PriceSeries::new(ticker, bars)
    }
}

impl MarketDataProvider for YahooClient {
    async fn fetch_daily_bars(&self, ticker: &str, window: FetchWindow) -> Result<PriceSeries> {
        self.fetch(ticker, window).await
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

fn unavailable(ticker: &str, window: FetchWindow) -> Error {
    Error::DataUnavailable {
        ticker: ticker.to_string(),
        period: window.to_string(),
    }
}

/// Decode a chart response body into normalized bars
fn parse_chart(
    body: &str,
    status: StatusCode,
    ticker: &str,
    window: FetchWindow,
) -> Result<Vec<PriceBar>> {
    if status == StatusCode::NOT_FOUND {
        return Err(unavailable(ticker, window));
    }

    let parsed: ChartResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(Error::Provider {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(error) = parsed.chart.error {
        if error.code == NOT_FOUND_CODE {
            return Err(unavailable(ticker, window));
        }
        return Err(Error::Provider {
            status: status.as_u16(),
            message: format!("{}: {}", error.code, error.description),
        });
    }

    if !status.is_success() {
        return Err(Error::Provider {
            status: status.as_u16(),
            message: "unexpected response".to_string(),
        });
    }

    let result = parsed
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| unavailable(ticker, window))?;

    Ok(flatten_chart(result))
}
