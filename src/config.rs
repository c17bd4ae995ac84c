use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::models::LookbackPeriod;
use crate::strategy::CrossoverConfig;
use crate::Result;

/// Prefix for environment overrides, e.g. `STOCKCAST__ANALYSIS__PERIOD=1y`
const ENV_PREFIX: &str = "STOCKCAST";
const DEFAULT_CONFIG_NAME: &str = "stockcast";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) stockcast/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSettings {
    pub period: String,
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let crossover = CrossoverConfig::default();
        Self {
            period: LookbackPeriod::default().to_string(),
            short_window: crossover.short_window,
            long_window: crossover.long_window,
        }
    }
}

impl AnalysisSettings {
    pub fn period(&self) -> Result<LookbackPeriod> {
        self.period.parse()
    }

    pub fn crossover(&self) -> Result<CrossoverConfig> {
        CrossoverConfig::new(self.short_window, self.long_window)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSettings {
    /// Where the offline trainer writes, and `--saved` predictions read, the model artifact
    pub path: PathBuf,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stock_model.json"),
        }
    }
}

/// Application settings: defaults, then `stockcast.toml`, then `STOCKCAST__*` env vars
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub catalog_path: PathBuf,
    pub provider: ProviderSettings,
    pub analysis: AnalysisSettings,
    pub model: ModelSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("stocks.csv"),
            provider: ProviderSettings::default(),
            analysis: AnalysisSettings::default(),
            model: ModelSettings::default(),
        }
    }
}

impl Settings {
    /// Load layered settings. An explicit file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::debug!("Loaded settings: {:?}", settings);

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.analysis.period()?;
        self.analysis.crossover()?;

        if self.provider.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "provider.timeout_secs must be positive".to_string(),
            ));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("provider.base_url is empty".to_string()));
        }

        Ok(())
    }
}
