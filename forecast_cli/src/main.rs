use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use forecast_cli::report;
use forecast_cli::Session;
use log::{debug, info};
use sarima_forecast::config::{
    validate_horizon_control, DEFAULT_DATA_PATH, DEFAULT_HISTORY_WINDOW, DEFAULT_HORIZON,
    DEFAULT_MODEL_PATH, DEFAULT_OUTPUT_PATH,
};
use sarima_forecast::export::save_forecast_csv;
use sarima_forecast::AppConfig;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

/// Which part of the report to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    History,
    Forecast,
    Model,
    All,
}

impl Section {
    fn includes(self, other: Section) -> bool {
        self == Section::All || self == other
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sarima-forecast",
    version,
    about = "Apple stock price forecast from a pre-fitted SARIMA model"
)]
struct Cli {
    /// Historical price CSV (day-first dates)
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Fitted model artifact
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Forecast horizon in business days (5 to 240, step 5)
    #[arg(long, default_value_t = DEFAULT_HORIZON, value_parser = parse_horizon)]
    horizon: usize,

    /// Hide the 95% confidence interval
    #[arg(long)]
    no_interval: bool,

    /// Business days of history to print
    #[arg(long, default_value_t = DEFAULT_HISTORY_WINDOW)]
    history: usize,

    /// Where to write the forecast CSV
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Report section to print
    #[arg(long, value_enum, default_value_t = Section::All)]
    section: Section,
}

impl Cli {
    fn to_config(&self) -> AppConfig {
        AppConfig::new()
            .with_data_path(&self.data)
            .with_model_path(&self.model)
            .with_output_path(&self.output)
            .with_horizon(self.horizon)
            .with_show_interval(!self.no_interval)
            .with_history_window(self.history)
    }
}

fn parse_horizon(raw: &str) -> std::result::Result<usize, String> {
    let horizon: usize = raw.parse().map_err(|e| format!("{}", e))?;
    validate_horizon_control(horizon).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.to_config();

    let session = match Session::open(config) {
        Ok(session) => session,
        Err(e) if e.is_fatal() => {
            debug!("{:?}", e);
            eprintln!("{}", report::fatal_message(&e));
            process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to start the forecasting session"),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::render_metrics(&mut out, &session.metric_cards())?;

    if cli.section.includes(Section::History) {
        report::render_history(&mut out, session.series(), session.config().history_window)?;
    }

    if cli.section.includes(Section::Forecast) {
        let result = session.forecast().context("Forecast failed")?;
        report::render_forecast(&mut out, &result)?;

        let output = &session.config().output_path;
        save_forecast_csv(&result, output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Forecast CSV written to {}", output.display());
    }

    if cli.section.includes(Section::Model) {
        report::render_model_info(&mut out, session.model())?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["sarima-forecast"]).unwrap();
        let config = cli.to_config();

        assert_eq!(config, AppConfig::new());
        assert_eq!(cli.section, Section::All);
    }

    #[test]
    fn test_horizon_follows_slider_steps() {
        let cli = Cli::try_parse_from(["sarima-forecast", "--horizon", "240"]).unwrap();
        assert_eq!(cli.horizon, 240);

        for bad in ["32", "0", "245", "abc"] {
            assert!(
                Cli::try_parse_from(["sarima-forecast", "--horizon", bad]).is_err(),
                "horizon {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_no_interval_and_paths() {
        let cli = Cli::try_parse_from([
            "sarima-forecast",
            "--no-interval",
            "--data",
            "prices.csv",
            "--output",
            "out.csv",
        ])
        .unwrap();
        let config = cli.to_config();

        assert!(!config.show_interval);
        assert_eq!(config.data_path, PathBuf::from("prices.csv"));
        assert_eq!(config.output_path, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_model_section_skips_forecast() {
        let cli = Cli::try_parse_from(["sarima-forecast", "--section", "model"]).unwrap();

        assert!(cli.section.includes(Section::Model));
        assert!(!cli.section.includes(Section::Forecast));
        assert!(!cli.section.includes(Section::History));
        assert!(Section::All.includes(Section::Forecast));
    }
}
