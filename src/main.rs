use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stockcast::error::Error;
use stockcast::prediction::load_artifact;
use stockcast::report::{self, RenderOptions};
use stockcast::{Dashboard, DashboardReport, Settings, SymbolCatalog};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Stock dashboard: moving-average signal and next-day price prediction")]
struct Cli {
    /// Path to a settings file (defaults to ./stockcast.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog entries, optionally filtered by name or symbol
    Symbols {
        #[arg(long)]
        search: Option<String>,
    },

    /// Show current price, trading signal and price chart
    Analyze {
        /// Ticker, catalog label or part of a company name
        stock: String,

        /// Lookback period (e.g. 6mo, 1y, 3y, max)
        #[arg(long)]
        period: Option<String>,

        /// Chart rows to print (most recent last)
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict the next day's closing price
    Predict {
        /// Ticker, catalog label or part of a company name
        stock: String,

        /// Lookback period used for training (e.g. 1y, 3y)
        #[arg(long)]
        period: Option<String>,

        /// Use a saved model artifact instead of training on the fetched history
        #[arg(long)]
        saved: bool,

        /// Model artifact path (defaults to model.path from settings)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Symbols { search } => list_symbols(&settings, search.as_deref()),
        Commands::Analyze {
            stock,
            period,
            rows,
            json,
        } => {
            apply_period(&mut settings, period)?;
            let report = run_dashboard(&settings, &stock, None).await?;
            let options = RenderOptions {
                chart_rows: rows,
                show_signal: true,
                show_prediction: false,
            };
            print_report(&report, options, json)
        }
        Commands::Predict {
            stock,
            period,
            saved,
            model,
            json,
        } => {
            apply_period(&mut settings, period)?;
            let model_path = (saved || model.is_some())
                .then(|| model.unwrap_or_else(|| settings.model.path.clone()));
            let report = run_dashboard(&settings, &stock, model_path).await?;
            let options = RenderOptions {
                chart_rows: 0,
                show_signal: false,
                show_prediction: true,
            };
            print_report(&report, options, json)
        }
    }
}

// ============================================================================
// Initialization Functions
// ============================================================================

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stockcast=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_period(settings: &mut Settings, period: Option<String>) -> Result<()> {
    if let Some(period) = period {
        settings.analysis.period = period;
        settings.validate().context("Invalid --period")?;
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn list_symbols(settings: &Settings, search: Option<&str>) -> Result<()> {
    let catalog = SymbolCatalog::from_path(&settings.catalog_path)
        .context("Failed to load symbol catalog")?;

    let entries = catalog.search(search.unwrap_or_default());
    if entries.is_empty() {
        println!("No matching stocks");
    } else {
        print!("{}", report::symbol_list(&entries));
    }
    Ok(())
}

/// Map user input to a ticker through the catalog, falling back to the raw input
fn resolve_ticker(settings: &Settings, stock: &str) -> String {
    let catalog = match SymbolCatalog::from_path(&settings.catalog_path) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::debug!("Catalog unavailable ({}), using input as ticker", e);
            return stock.trim().to_uppercase();
        }
    };

    match catalog.resolve(stock) {
        Ok(entry) => {
            tracing::info!("Selected {}", entry.display());
            entry.symbol.clone()
        }
        Err(e) => {
            tracing::warn!("{}, using input as ticker", e);
            stock.trim().to_uppercase()
        }
    }
}

async fn run_dashboard(
    settings: &Settings,
    stock: &str,
    model_path: Option<PathBuf>,
) -> Result<DashboardReport> {
    let ticker = resolve_ticker(settings, stock);
    let dashboard = Dashboard::from_settings(settings).context("Failed to set up dashboard")?;

    let result = match model_path {
        Some(path) => {
            let artifact = load_artifact(&path)
                .with_context(|| format!("Failed to load model from {}", path.display()))?;
            if artifact.ticker != ticker {
                tracing::warn!(
                    "Model was trained on {}, predicting {} with it",
                    artifact.ticker,
                    ticker
                );
            }
            dashboard.run_with_model(&ticker, &artifact.model).await
        }
        None => dashboard.run(&ticker).await,
    };

    match result {
        Ok(report) => Ok(report),
        Err(e @ Error::DataUnavailable { .. }) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e).with_context(|| format!("Dashboard failed for {}", ticker)),
    }
}

fn print_report(report: &DashboardReport, options: RenderOptions, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{}", out);
    } else {
        print!("{}", report::render(report, options));
    }
    Ok(())
}
