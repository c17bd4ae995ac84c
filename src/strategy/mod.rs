// Trading signal module
// Moving-average crossover: golden cross → BUY, death cross → SELL, otherwise HOLD
pub mod crossover;
pub mod signals;

pub use crossover::{classify_crossover, derive_signal, evaluate_signal};
pub use signals::{compute_moving_averages, AnalyzedSeries, CrossoverConfig};
