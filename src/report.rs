use std::fmt::Write;

use crate::catalog::CatalogEntry;
use crate::models::{ChartPoint, PriceChange, Signal, SignalReading, SignalReason};
use crate::pipeline::{DashboardReport, Forecast};
use crate::strategy::CrossoverConfig;

pub const DISCLAIMER: &str = "⚠️  Educational purpose only. Not financial advice.";

/// Which dashboard sections to print
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub chart_rows: usize,
    pub show_signal: bool,
    pub show_prediction: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            chart_rows: 10,
            show_signal: true,
            show_prediction: false,
        }
    }
}

pub fn price_line(price: &PriceChange) -> String {
    match (price.change, price.percent) {
        (Some(change), Some(percent)) => format!(
            "💰 Current Price: ${:.2}  ({:+.2} ({:+.2}%))",
            price.current, change, percent
        ),
        _ => format!("💰 Current Price: ${:.2}", price.current),
    }
}

pub fn signal_badge(reading: &SignalReading) -> String {
    let icon = match reading.signal {
        Signal::Buy => "✅",
        Signal::Sell => "❌",
        Signal::Hold => "⏸️ ",
    };
    format!("{} {} - {}", icon, reading.signal, reading.signal.headline())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

/// The last `rows` chart points as a fixed-width table
pub fn chart_table(points: &[ChartPoint], rows: usize, windows: &CrossoverConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>10} {:>10} {:>10}",
        "Date",
        "Close",
        format!("MA{}", windows.short_window),
        format!("MA{}", windows.long_window)
    );
    let _ = writeln!(out, "{}", "─".repeat(45));

    let skip = points.len().saturating_sub(rows);
    for point in &points[skip..] {
        let _ = writeln!(
            out,
            "{:<12} {:>10.2} {:>10} {:>10}",
            point.date.format("%Y-%m-%d").to_string(),
            point.close,
            fmt_opt(point.ma_short),
            fmt_opt(point.ma_long)
        );
    }
    out
}

pub fn prediction_line(prediction: Option<&Forecast>) -> String {
    match prediction {
        Some(forecast) => format!(
            "📈 Predicted Next Day Price: ${:.2}\n   Prediction uses Linear Regression on historical prices",
            forecast.predicted
        ),
        None => "🤖 Prediction unavailable: not enough history to train".to_string(),
    }
}

/// Full text rendering of a dashboard report
pub fn render(report: &DashboardReport, options: RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "📈 {}  ({} daily bars, {})",
        report.ticker, report.bars, report.period
    );
    let _ = writeln!(out, "{}", price_line(&report.analysis.price));

    if options.show_signal {
        let reading = &report.analysis.reading;
        let _ = writeln!(out, "\n📌 Trading Signal\n{}", signal_badge(reading));
        if reading.reason == SignalReason::InsufficientHistory {
            let _ = writeln!(
                out,
                "   (not enough history to compare both moving averages)"
            );
        }
    }

    if options.chart_rows > 0 {
        let _ = writeln!(out, "\n📊 Price Chart with Moving Averages");
        out.push_str(&chart_table(
            &report.analysis.chart,
            options.chart_rows,
            &report.windows,
        ));
    }

    if options.show_prediction {
        let _ = writeln!(out, "\n🤖 Machine Learning Prediction");
        let _ = writeln!(out, "{}", prediction_line(report.prediction.as_ref()));
    }

    let _ = writeln!(out, "\n{}", DISCLAIMER);
    out
}

/// One catalog entry per line, as shown in the selection list
pub fn symbol_list(entries: &[&CatalogEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}", entry.display());
    }
    out
}
