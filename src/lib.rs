// Core modules
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod indicators;
pub mod models;
pub mod pipeline;
pub mod prediction;
pub mod report;
pub mod strategy;

// Re-export commonly used types
pub use api::{FetchWindow, MarketDataProvider, YahooClient};
pub use catalog::{CatalogEntry, SymbolCatalog};
pub use crate::config::Settings;
pub use error::Error;
pub use models::*;
pub use pipeline::{Dashboard, DashboardReport};
pub use prediction::RegressionModel;

// Error handling
pub type Result<T> = std::result::Result<T, Error>;
