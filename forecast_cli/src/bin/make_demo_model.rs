use anyhow::{Context, Result};
use clap::Parser;
use sarima_forecast::models::{SarimaCoefficients, SarimaOrder, SeasonalOrder};
use sarima_forecast::{DataLoader, ModelRepository, SarimaModel};
use std::path::PathBuf;

/// Build a SARIMA(1,1,1)x(1,1,1,s) artifact from known coefficients.
///
/// Coefficients are taken as given; this only runs them over the price
/// series to capture the state the forecast recursion needs.
#[derive(Parser, Debug)]
#[command(name = "make_demo_model", version)]
struct Args {
    /// Historical price CSV
    #[arg(long, default_value = sarima_forecast::config::DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Artifact to write
    #[arg(long, default_value = sarima_forecast::config::DEFAULT_MODEL_PATH)]
    output: PathBuf,

    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    ar: f64,

    #[arg(long, default_value_t = -0.2, allow_negative_numbers = true)]
    ma: f64,

    #[arg(long, default_value_t = 0.05, allow_negative_numbers = true)]
    seasonal_ar: f64,

    #[arg(long, default_value_t = -0.9, allow_negative_numbers = true)]
    seasonal_ma: f64,

    /// Seasonal period in business days
    #[arg(long, default_value_t = 5)]
    period: usize,

    /// Innovation variance; estimated from the residuals when omitted
    #[arg(long)]
    sigma2: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let series = DataLoader::load(&args.data)
        .with_context(|| format!("Failed to load {}", args.data.display()))?;

    let coefficients = SarimaCoefficients {
        ar: vec![args.ar],
        ma: vec![args.ma],
        seasonal_ar: vec![args.seasonal_ar],
        seasonal_ma: vec![args.seasonal_ma],
        sigma2: args.sigma2.unwrap_or(0.0),
    };
    let mut model = SarimaModel::condition(
        SarimaOrder::new(1, 1, 1),
        SeasonalOrder::new(1, 1, 1, args.period),
        coefficients,
        series.values(),
    )
    .context("Failed to condition the model on the series")?
    .with_training_end(series.last_date())
    .with_dependent_variable("Close");

    if args.sigma2.is_none() {
        let sigma2 = model.conditional_sigma2(series.values())?;
        log::info!("Estimated sigma2 = {:.4} from in-sample residuals", sigma2);
        model = model.with_sigma2(sigma2);
    }

    ModelRepository::save(&model, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!(
        "Wrote {} ({} observations, ends {}) to {}",
        model.name(),
        model.nobs(),
        series.last_date(),
        args.output.display()
    );

    Ok(())
}
