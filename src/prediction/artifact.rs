use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::regression::{training_pairs, RegressionModel};
use crate::models::PriceSeries;
use crate::Result;

/// Serialized regression model, reloadable without retraining
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    pub ticker: String,
    pub trained_at: DateTime<Utc>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub training_pairs: usize,
    pub model: RegressionModel,
}

impl ModelArtifact {
    /// Fit a model on the series and wrap it with its provenance
    pub fn train(series: &PriceSeries) -> Result<Self> {
        let model = RegressionModel::fit(series)?;

        Ok(Self {
            ticker: series.ticker().to_string(),
            trained_at: Utc::now(),
            first_date: series.first_date(),
            last_date: series.last_date(),
            training_pairs: training_pairs(series).len(),
            model,
        })
    }
}

/// Write the artifact as pretty-printed JSON
pub fn save_artifact(path: impl AsRef<Path>, artifact: &ModelArtifact) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(path, json)?;

    tracing::info!(
        "Saved {} model ({} pairs) to {}",
        artifact.ticker,
        artifact.training_pairs,
        path.display()
    );

    Ok(())
}

pub fn load_artifact(path: impl AsRef<Path>) -> Result<ModelArtifact> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let artifact: ModelArtifact = serde_json::from_str(&json)?;

    tracing::debug!("Loaded {} model from {}", artifact.ticker, path.display());

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceBar;
    use chrono::Duration;

    #[test]
    fn test_save_and_load_preserves_coefficients() {
        let start = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let bars = [171.03, 170.97, 171.9, 173.85, 173.45, 173.48, 174.1]
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 25_000_000.0,
            })
            .collect();
        let series = PriceSeries::new("AAPL", bars).unwrap();
        let artifact = ModelArtifact::train(&series).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock_model.json");
        save_artifact(&path, &artifact).unwrap();
        let loaded = load_artifact(&path).unwrap();

        assert_eq!(loaded.ticker, "AAPL");
        assert_eq!(loaded.training_pairs, 6);
        assert_eq!(loaded.first_date, Some(start));

        let rel = |a: f64, b: f64| (a - b).abs() / b.abs().max(1e-300);
        assert!(rel(loaded.model.slope, artifact.model.slope) < 1e-9);
        assert!(rel(loaded.model.intercept, artifact.model.intercept) < 1e-9);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_artifact(dir.path().join("missing.json")).is_err());
    }
}
