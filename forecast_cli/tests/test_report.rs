use chrono::NaiveDate;
use forecast_cli::demo::{synthetic_prices, write_price_csv};
use forecast_cli::report::{
    fatal_message, render_forecast, render_history, render_metrics, render_model_info,
};
use forecast_cli::Session;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sarima_forecast::models::{SarimaCoefficients, SarimaOrder, SeasonalOrder};
use sarima_forecast::{AppConfig, DataLoader, ForecastError, ModelRepository, SarimaModel};
use std::fs::File;
use tempfile::{tempdir, TempDir};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Writes demo data and a conditioned model into a temp dir
fn demo_workspace() -> (TempDir, AppConfig) {
    let dir = tempdir().unwrap();
    let data_path = dir.path().join("Stock Market.csv");
    let model_path = dir.path().join("sarima_model.json");

    let mut rng = StdRng::seed_from_u64(7);
    let records = synthetic_prices(&mut rng, date(2023, 6, 1), 150, 180.0, 0.02);
    write_price_csv(&records, File::create(&data_path).unwrap()).unwrap();

    let series = DataLoader::load(&data_path).unwrap();
    let model = SarimaModel::condition(
        SarimaOrder::new(1, 1, 1),
        SeasonalOrder::new(1, 1, 1, 5),
        SarimaCoefficients {
            ar: vec![0.1],
            ma: vec![-0.2],
            seasonal_ar: vec![0.05],
            seasonal_ma: vec![-0.9],
            sigma2: 3.0,
        },
        series.values(),
    )
    .unwrap()
    .with_training_end(series.last_date());
    ModelRepository::save(&model, &model_path).unwrap();

    let config = AppConfig::new()
        .with_data_path(data_path)
        .with_model_path(model_path)
        .with_output_path(dir.path().join("forecast.csv"));
    (dir, config)
}

fn rendered<F>(f: F) -> String
where
    F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>,
{
    let mut buffer = Vec::new();
    f(&mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[test]
fn test_synthetic_prices_are_well_formed() {
    let mut rng = StdRng::seed_from_u64(1);
    let records = synthetic_prices(&mut rng, date(2024, 1, 6), 20, 100.0, 0.03);

    assert_eq!(records.len(), 20);
    assert_eq!(records[0].date, date(2024, 1, 8));
    for r in &records {
        assert!(r.close > 0.0);
        assert!(r.high.unwrap() >= r.close);
        assert!(r.low.unwrap() <= r.close);
    }
}

#[test]
fn test_session_opens_and_forecasts() {
    let (_dir, config) = demo_workspace();
    let session = Session::open(config.clone().with_horizon(10)).unwrap();

    let cards = session.metric_cards();
    assert_eq!(cards.forecast_days, 10);
    assert_eq!(cards.observations, 150);
    assert_eq!(cards.last_date, session.series().last_date());

    let result = session.forecast().unwrap();
    assert_eq!(result.len(), 10);
    assert!(result.has_interval());

    let hidden = session.forecast_with(10, false).unwrap();
    assert_eq!(hidden.predicted(), result.predicted());
    assert!(!hidden.has_interval());
}

#[test]
fn test_missing_model_is_fatal() {
    let (dir, config) = demo_workspace();
    let config = config.with_model_path(dir.path().join("absent.json"));

    let err = Session::open(config).unwrap_err();

    assert!(err.is_fatal());
    assert!(fatal_message(&err).contains("absent.json"));
}

#[test]
fn test_missing_data_is_fatal() {
    let (dir, config) = demo_workspace();
    let config = config.with_data_path(dir.path().join("absent.csv"));

    let err = Session::open(config).unwrap_err();

    assert!(matches!(err, ForecastError::DataError(_)));
    assert!(fatal_message(&err).starts_with("Could not load historical data"));
}

#[test]
fn test_render_metrics() {
    let (_dir, config) = demo_workspace();
    let session = Session::open(config).unwrap();
    let cards = session.metric_cards();

    let text = rendered(|w| render_metrics(w, &cards));

    assert!(text.contains(&format!("Last Close     ${:.2}", cards.last_close)));
    assert!(text.contains("Forecast Days  30"));
    assert!(text.contains("Observations   150"));
}

#[test]
fn test_render_history_tail() {
    let (_dir, config) = demo_workspace();
    let session = Session::open(config).unwrap();

    let text = rendered(|w| render_history(w, session.series(), 5));
    let rows: Vec<&str> = text.lines().skip(2).take(5).collect();

    assert!(text.starts_with("Last 5 Business Days"));
    assert_eq!(rows.len(), 5);
    let last_date = session.series().last_date().format("%Y-%m-%d").to_string();
    assert!(rows[4].starts_with(&last_date));
}

#[test]
fn test_render_forecast_columns() {
    let (_dir, config) = demo_workspace();
    let session = Session::open(config).unwrap();

    let with = rendered(|w| render_forecast(w, &session.forecast_with(5, true).unwrap()));
    let without = rendered(|w| render_forecast(w, &session.forecast_with(5, false).unwrap()));

    assert!(with.contains("Lower_95"));
    assert!(!without.contains("Lower_95"));
    assert_eq!(with.lines().count(), 8);
}

#[test]
fn test_render_model_info() {
    let (_dir, config) = demo_workspace();
    let session = Session::open(config).unwrap();

    let text = rendered(|w| render_model_info(w, session.model()));

    assert!(text.contains("Order (p,d,q): (1,1,1)"));
    assert!(text.contains("Seasonal Order (P,D,Q,s): (1,1,1,5)"));
    assert!(text.contains("Observations used: 150"));
}
