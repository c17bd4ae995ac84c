//! Dashboard pipeline: fetch → analyze → predict
//!
//! `analyze` and `predict` are pure functions over a fetched series; `Dashboard`
//! is the thin shell that runs the three steps in order for one ticker.

use chrono::NaiveDate;
use serde::Serialize;

use crate::api::{FetchWindow, MarketDataProvider, YahooClient};
use crate::config::Settings;
use crate::error::Error;
use crate::models::{ChartPoint, LookbackPeriod, PriceChange, PriceSeries, SignalReading};
use crate::prediction::{training_pairs, RegressionModel};
use crate::strategy::{compute_moving_averages, evaluate_signal, CrossoverConfig};
use crate::Result;

/// Price, signal and chart for one series
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub price: PriceChange,
    pub reading: SignalReading,
    pub chart: Vec<ChartPoint>,
}

/// Next-day prediction from the latest close
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Forecast {
    pub model: RegressionModel,
    pub current_close: f64,
    pub predicted: f64,
}

/// Everything the presentation layer renders for one ticker
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub ticker: String,
    pub period: String,
    pub bars: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub windows: CrossoverConfig,
    pub analysis: Analysis,
    /// `None` when there is too little history to train
    pub prediction: Option<Forecast>,
}

/// Fetch step: one provider call, no retry
pub async fn fetch<P: MarketDataProvider>(
    provider: &P,
    ticker: &str,
    period: LookbackPeriod,
) -> Result<PriceSeries> {
    let series = provider
        .fetch_daily_bars(ticker, FetchWindow::Lookback(period))
        .await?;

    if series.is_empty() {
        return Err(Error::DataUnavailable {
            ticker: ticker.to_string(),
            period: period.to_string(),
        });
    }

    Ok(series)
}

fn empty_series(series: &PriceSeries) -> Error {
    Error::DataUnavailable {
        ticker: series.ticker().to_string(),
        period: "empty series".to_string(),
    }
}

/// Analyze step: price change, crossover signal and chart columns
pub fn analyze(series: &PriceSeries, config: &CrossoverConfig) -> Result<Analysis> {
    let price = series.price_change().ok_or_else(|| empty_series(series))?;
    let analyzed = compute_moving_averages(series, config);
    let reading = evaluate_signal(&analyzed);

    Ok(Analysis {
        price,
        reading,
        chart: analyzed.chart(),
    })
}

/// Predict step: train on the series, then predict from its last close
pub fn predict(series: &PriceSeries) -> Result<Forecast> {
    let model = RegressionModel::fit(series)?;
    forecast_with(&model, series)
}

/// Predict from the last close with an already fitted (or reloaded) model
pub fn forecast_with(model: &RegressionModel, series: &PriceSeries) -> Result<Forecast> {
    let current_close = series.last_close().ok_or_else(|| empty_series(series))?;

    Ok(Forecast {
        model: *model,
        current_close,
        predicted: model.predict(current_close),
    })
}

/// Runs the pipeline for one ticker at a time
pub struct Dashboard<P> {
    provider: P,
    period: LookbackPeriod,
    crossover: CrossoverConfig,
}

impl Dashboard<YahooClient> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = YahooClient::new(&settings.provider)?;
        Ok(Self::new(
            provider,
            settings.analysis.period()?,
            settings.analysis.crossover()?,
        ))
    }
}

impl<P: MarketDataProvider> Dashboard<P> {
    pub fn new(provider: P, period: LookbackPeriod, crossover: CrossoverConfig) -> Self {
        Self {
            provider,
            period,
            crossover,
        }
    }

    pub async fn load(&self, ticker: &str) -> Result<PriceSeries> {
        fetch(&self.provider, ticker, self.period).await
    }

    /// Fetch, analyze and predict, training a fresh model on the fetched series
    pub async fn run(&self, ticker: &str) -> Result<DashboardReport> {
        let series = self.load(ticker).await?;
        self.report(&series, None)
    }

    /// Same as `run`, but predicts with a reloaded model instead of training
    pub async fn run_with_model(
        &self,
        ticker: &str,
        model: &RegressionModel,
    ) -> Result<DashboardReport> {
        let series = self.load(ticker).await?;
        self.report(&series, Some(model))
    }

    /// Build the report for an already fetched series
    pub fn report(
        &self,
        series: &PriceSeries,
        model: Option<&RegressionModel>,
    ) -> Result<DashboardReport> {
        tracing::info!(
            "Analyzing {} ({} bars via {})",
            series.ticker(),
            series.len(),
            self.provider.name()
        );

        let analysis = analyze(series, &self.crossover)?;

        let prediction = match model {
            Some(model) => Some(forecast_with(model, series)?),
            None => match predict(series) {
                Ok(forecast) => Some(forecast),
                Err(e) if e.halts_pipeline() => return Err(e),
                Err(e) => {
                    tracing::warn!("Prediction disabled for {}: {}", series.ticker(), e);
                    None
                }
            },
        };

        if let Some(forecast) = &prediction {
            tracing::info!(
                "{}: {} ({:?}), next close ≈ {:.2} from {} training pairs",
                series.ticker(),
                analysis.reading.signal,
                analysis.reading.reason,
                forecast.predicted,
                training_pairs(series).len()
            );
        }

        Ok(DashboardReport {
            ticker: series.ticker().to_string(),
            period: self.period.to_string(),
            bars: series.len(),
            first_date: series.first_date(),
            last_date: series.last_date(),
            windows: self.crossover,
            analysis,
            prediction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceBar, Signal, SignalReason};
    use chrono::Duration;
    use std::cell::Cell;

    /// Serves a fixed series and counts calls
    struct StaticProvider {
        closes: Vec<f64>,
        calls: Cell<usize>,
    }

    impl StaticProvider {
        fn new(closes: Vec<f64>) -> Self {
            Self {
                closes,
                calls: Cell::new(0),
            }
        }
    }

    impl MarketDataProvider for StaticProvider {
        async fn fetch_daily_bars(&self, ticker: &str, window: FetchWindow) -> Result<PriceSeries> {
            self.calls.set(self.calls.get() + 1);
            if self.closes.is_empty() {
                return Err(Error::DataUnavailable {
                    ticker: ticker.to_string(),
                    period: window.to_string(),
                });
            }

            let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
            let bars = self
                .closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PriceBar {
                    date: start + Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1.0,
                })
                .collect();
            PriceSeries::new(ticker, bars)
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    fn dashboard(closes: Vec<f64>) -> Dashboard<StaticProvider> {
        Dashboard::new(
            StaticProvider::new(closes),
            LookbackPeriod::Years(3),
            CrossoverConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_run_full_report() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + i as f64 * 0.5).collect();
        let report = dashboard(closes).run("AAPL").await.unwrap();

        assert_eq!(report.bars, 120);
        assert_eq!(report.period, "3y");
        assert_eq!(report.analysis.chart.len(), 120);
        assert_eq!(report.analysis.reading.signal, Signal::Hold);
        assert_eq!(report.analysis.reading.reason, SignalReason::NoCrossover);
        assert!((report.analysis.price.change.unwrap() - 0.5).abs() < 1e-9);

        let forecast = report.prediction.unwrap();
        assert_eq!(forecast.current_close, 159.5);
        assert!((forecast.predicted - 160.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_data_unavailable_halts() {
        let dashboard = dashboard(Vec::new());
        let result = dashboard.run("NOPE").await;

        assert!(matches!(result, Err(Error::DataUnavailable { .. })));
        assert_eq!(dashboard.provider.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_short_history_disables_prediction_only() {
        let report = dashboard(vec![100.0, 101.0]).run("NEW").await.unwrap();

        assert!(report.prediction.is_none());
        assert_eq!(report.analysis.reading.signal, Signal::Hold);
        assert_eq!(report.analysis.reading.reason, SignalReason::InsufficientHistory);
        assert_eq!(report.analysis.price.current, 101.0);
    }

    #[tokio::test]
    async fn test_run_with_reloaded_model() {
        let model = RegressionModel {
            slope: 1.0,
            intercept: 2.0,
        };
        let report = dashboard(vec![100.0, 101.0])
            .run_with_model("NEW", &model)
            .await
            .unwrap();

        assert_eq!(report.prediction.unwrap().predicted, 103.0);
    }

    #[test]
    fn test_analyze_empty_series() {
        let series = PriceSeries::new("X", Vec::new()).unwrap();
        assert!(analyze(&series, &CrossoverConfig::default()).is_err());
        assert!(predict(&series).is_err());
    }

    #[test]
    fn test_report_keeps_only_section_errors() {
        let dashboard = dashboard(Vec::new());

        let empty = PriceSeries::new("X", Vec::new()).unwrap();
        match dashboard.report(&empty, None) {
            Err(e) => assert!(e.halts_pipeline()),
            Ok(_) => panic!("empty series must not produce a report"),
        }

        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let one_bar = vec![PriceBar {
            date: start,
            open: 10.0,
            high: 10.0,
            low: 10.0,
            close: 10.0,
            volume: 1.0,
        }];
        let series = PriceSeries::new("X", one_bar).unwrap();
        let report = dashboard.report(&series, None).unwrap();
        assert!(report.prediction.is_none());
    }
}
