use super::signals::AnalyzedSeries;
use crate::error::Error;
use crate::models::{Signal, SignalReading, SignalReason};
use crate::Result;

/// Classify a crossover between yesterday's and today's (short, long) averages
///
/// Strict inequalities only: equal averages on either day are not a cross.
pub fn classify_crossover(yesterday: (f64, f64), today: (f64, f64)) -> SignalReason {
    let (short_y, long_y) = yesterday;
    let (short_t, long_t) = today;

    if short_y < long_y && short_t > long_t {
        SignalReason::GoldenCross
    } else if short_y > long_y && short_t < long_t {
        SignalReason::DeathCross
    } else {
        SignalReason::NoCrossover
    }
}

fn signal_for(reason: SignalReason) -> Signal {
    match reason {
        SignalReason::GoldenCross => Signal::Buy,
        SignalReason::DeathCross => Signal::Sell,
        SignalReason::NoCrossover | SignalReason::InsufficientHistory => Signal::Hold,
    }
}

fn crossover_reason(analyzed: &AnalyzedSeries) -> Result<SignalReason> {
    let bars = analyzed.series().len();
    let required = analyzed.config().min_bars_required();
    let insufficient = Error::InsufficientHistory { bars, required };

    if bars < required {
        return Err(insufficient);
    }

    let today = bars - 1;
    let yesterday = bars - 2;

    match (analyzed.averages_at(yesterday), analyzed.averages_at(today)) {
        (Some(y), Some(t)) => Ok(classify_crossover(y, t)),
        _ => Err(insufficient),
    }
}

/// Derive BUY/SELL/HOLD from the last two days of moving averages
///
/// Fails with `InsufficientHistory` when either average is undefined on either day.
pub fn derive_signal(analyzed: &AnalyzedSeries) -> Result<Signal> {
    let reason = crossover_reason(analyzed)?;
    Ok(signal_for(reason))
}

/// Signal for display: insufficient history falls back to HOLD
pub fn evaluate_signal(analyzed: &AnalyzedSeries) -> SignalReading {
    let reason = match crossover_reason(analyzed) {
        Ok(reason) => reason,
        Err(e) => {
            tracing::warn!(
                "{} for {}, signal defaults to HOLD",
                e,
                analyzed.series().ticker()
            );
            SignalReason::InsufficientHistory
        }
    };

    let signal = signal_for(reason);
    tracing::debug!(
        "Signal for {}: {} ({:?})",
        analyzed.series().ticker(),
        signal,
        reason
    );

    SignalReading { signal, reason }
}
