use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use forecast_cli::demo::{synthetic_prices, write_price_csv};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::path::PathBuf;

/// Write a synthetic daily price file in the loader's input format
#[derive(Parser, Debug)]
#[command(name = "make_demo_data", version)]
struct Args {
    /// CSV to write
    #[arg(long, default_value = sarima_forecast::config::DEFAULT_DATA_PATH)]
    output: PathBuf,

    /// First trading day (YYYY-MM-DD)
    #[arg(long, default_value = "2019-01-02")]
    start: NaiveDate,

    /// Number of business days
    #[arg(long, default_value_t = 1250)]
    days: usize,

    /// Starting price
    #[arg(long, default_value_t = 150.0)]
    price: f64,

    /// Maximum daily move as a fraction of price
    #[arg(long, default_value_t = 0.02)]
    volatility: f64,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !(args.volatility >= 0.0 && args.volatility < 1.0) {
        bail!("volatility must be in [0, 1), got {}", args.volatility);
    }
    if !(args.price > 0.0) {
        bail!("price must be positive, got {}", args.price);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let records = synthetic_prices(&mut rng, args.start, args.days, args.price, args.volatility);

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    write_price_csv(&records, file)?;

    log::info!("Wrote {} business days to {}", records.len(), args.output.display());
    Ok(())
}
