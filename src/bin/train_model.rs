use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use stockcast::api::{FetchWindow, YahooClient};
use stockcast::prediction::{save_artifact, training_pairs, ModelArtifact};
use stockcast::Settings;

/// Offline trainer: fit the next-day regression once and save it for `stockcast predict --saved`
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Ticker to train on
    #[arg(default_value = "AAPL")]
    ticker: String,

    /// First day of training history
    #[arg(long, default_value = "2018-01-01")]
    since: NaiveDate,

    /// Output path (defaults to model.path from settings)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to a settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("stockcast=info")
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;

    println!("Starting model training...");

    let client = YahooClient::new(&settings.provider)?;
    let series = client
        .fetch(&args.ticker, FetchWindow::Since(args.since))
        .await
        .with_context(|| format!("Failed to download {} since {}", args.ticker, args.since))?;

    println!(
        "Data downloaded: {} bars ({} → {})",
        series.len(),
        series.first_date().map(|d| d.to_string()).unwrap_or_default(),
        series.last_date().map(|d| d.to_string()).unwrap_or_default()
    );

    println!("Training model...");
    let artifact = ModelArtifact::train(&series).context("Training failed")?;

    let pairs = training_pairs(&series);
    println!(
        "   slope={:.6} intercept={:.6} r²={:.4} mse={:.4}",
        artifact.model.slope,
        artifact.model.intercept,
        artifact.model.r_squared(&pairs),
        artifact.model.mean_squared_error(&pairs)
    );

    let out = args.out.unwrap_or_else(|| settings.model.path.clone());
    save_artifact(&out, &artifact)?;

    println!("✅ Model trained and {} created", out.display());
    Ok(())
}
