use thiserror::Error;

/// Errors produced by the dashboard pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Provider returned no rows for the ticker/period. Downstream steps must not run.
    #[error("No data found for {ticker} over {period}")]
    DataUnavailable { ticker: String, period: String },

    /// Not enough bars to evaluate both moving averages on the last two days
    #[error("Insufficient history: {bars} bars, need {required}")]
    InsufficientHistory { bars: usize, required: usize },

    /// Not enough (close, next close) pairs to fit the regression
    #[error("Insufficient training data: {pairs} pairs, need at least 2")]
    InsufficientData { pairs: usize },

    #[error("Bars are not strictly increasing by date at index {index}")]
    UnorderedBars { index: usize },

    #[error("Invalid lookback period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Symbol not found in catalog: {0}")]
    SymbolNotFound(String),

    #[error("Market data provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the errors that stop the whole pipeline rather than one section of it
    pub fn halts_pipeline(&self) -> bool {
        !matches!(
            self,
            Error::InsufficientHistory { .. } | Error::InsufficientData { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_unavailable_message() {
        let err = Error::DataUnavailable {
            ticker: "NOPE".to_string(),
            period: "3y".to_string(),
        };
        assert_eq!(err.to_string(), "No data found for NOPE over 3y");
        assert!(err.halts_pipeline());
    }

    #[test]
    fn test_section_errors_do_not_halt() {
        assert!(!Error::InsufficientData { pairs: 1 }.halts_pipeline());
        assert!(!Error::InsufficientHistory {
            bars: 10,
            required: 51
        }
        .halts_pipeline());
    }
}
