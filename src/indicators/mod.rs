// Technical indicators module
// Trailing simple moving averages over closing prices

pub mod moving_average;

pub use moving_average::rolling_sma;
