use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use sarima_forecast::calendar::next_business_day;
use sarima_forecast::export::forecast_csv_string;
use sarima_forecast::models::{
    FittedModel, ModelForecast, ModelSummary, SarimaCoefficients, SarimaModel, SarimaOrder,
    SarimaState, SeasonalOrder,
};
use sarima_forecast::{CleanedSeries, ForecastError, ForecastRequest, ForecastService, Result};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn december_series() -> CleanedSeries {
    let mut dates = vec![date(2023, 12, 18)];
    while dates.len() < 10 {
        let next = next_business_day(*dates.last().unwrap());
        dates.push(next);
    }
    let values = (0..10).map(|i| 190.0 + i as f64).collect();
    CleanedSeries::new(dates, values).unwrap()
}

fn random_walk(last: f64) -> SarimaModel {
    SarimaModel::new(
        SarimaOrder::new(0, 1, 0),
        SeasonalOrder::none(),
        SarimaCoefficients {
            ar: vec![],
            ma: vec![],
            seasonal_ar: vec![],
            seasonal_ma: vec![],
            sigma2: 4.0,
        },
        SarimaState {
            observations: vec![last],
            residuals: vec![],
        },
        10,
    )
    .unwrap()
}

/// Model that forgets to return its interval
#[derive(Debug)]
struct NoIntervalModel;

impl FittedModel for NoIntervalModel {
    fn forecast(&self, steps: usize) -> Result<ModelForecast> {
        Ok(ModelForecast {
            mean: vec![0.0; steps],
            interval: None,
        })
    }

    fn describe(&self) -> ModelSummary {
        ModelSummary {
            text: "none".to_string(),
            nobs: 0,
        }
    }
}

#[test]
fn test_new_year_scenario() {
    let series = december_series();
    assert_eq!(series.last_date(), date(2023, 12, 29));

    let model = random_walk(series.last_value());
    let request = ForecastRequest::new(5, true).unwrap();
    let result = ForecastService::for_series(&model, &series)
        .forecast(&request)
        .unwrap();

    assert_eq!(
        result.dates(),
        vec![
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 4),
            date(2024, 1, 5),
        ]
    );
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(30)]
#[case(240)]
fn test_length_matches_horizon(#[case] horizon: usize) {
    let series = december_series();
    let model = random_walk(series.last_value());
    let request = ForecastRequest::new(horizon, false).unwrap();

    let result = ForecastService::for_series(&model, &series)
        .forecast(&request)
        .unwrap();

    assert_eq!(result.len(), horizon);
    assert_eq!(result.first_date(), Some(next_business_day(series.last_date())));
    for pair in result.dates().windows(2) {
        assert_eq!(next_business_day(pair[0]), pair[1]);
    }
}

#[test]
fn test_without_interval_has_no_bounds() {
    let series = december_series();
    let model = random_walk(series.last_value());
    let request = ForecastRequest::new(10, false).unwrap();

    let result = ForecastService::for_series(&model, &series)
        .forecast(&request)
        .unwrap();

    assert!(!result.has_interval());
    assert!(result.iter().all(|p| p.bounds.is_none()));
}

#[test]
fn test_with_interval_brackets_prediction() {
    let series = december_series();
    let model = random_walk(series.last_value());
    let request = ForecastRequest::new(10, true).unwrap();

    let result = ForecastService::for_series(&model, &series)
        .forecast(&request)
        .unwrap();

    assert!(result.has_interval());
    for point in result.iter() {
        let bounds = point.bounds.unwrap();
        assert!(bounds.lower <= point.predicted);
        assert!(point.predicted <= bounds.upper);
    }
}

#[test]
fn test_interval_copied_from_model() {
    let series = december_series();
    let model = random_walk(series.last_value());
    let request = ForecastRequest::new(3, true).unwrap();

    let result = ForecastService::for_series(&model, &series)
        .forecast(&request)
        .unwrap();
    let raw = model.forecast(3).unwrap();
    let (lower, upper) = raw.interval.unwrap();

    for (i, point) in result.iter().enumerate() {
        assert_eq!(point.predicted, raw.mean[i]);
        assert_eq!(point.bounds.unwrap().lower, lower[i]);
        assert_eq!(point.bounds.unwrap().upper, upper[i]);
    }
}

#[test]
fn test_zero_horizon() {
    let series = december_series();
    let model = random_walk(series.last_value());
    let request = ForecastRequest::new(0, true).unwrap();

    let result = ForecastService::for_series(&model, &series)
        .forecast(&request)
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(
        forecast_csv_string(&result).unwrap(),
        "Date,Predicted_Close,Lower_95,Upper_95\n"
    );
}

#[test]
fn test_missing_interval_is_contract_violation() {
    let request = ForecastRequest::new(5, true).unwrap();
    let service = ForecastService::new(&NoIntervalModel, date(2023, 12, 29));

    assert!(matches!(
        service.forecast(&request),
        Err(ForecastError::ContractViolation(_))
    ));

    // without the interval the same model is fine
    let request = ForecastRequest::new(5, false).unwrap();
    assert_eq!(service.forecast(&request).unwrap().len(), 5);
}

#[test]
fn test_training_cutoff_mismatch_still_forecasts() {
    let series = december_series();
    let model = random_walk(series.last_value()).with_training_end(date(2023, 12, 22));
    let request = ForecastRequest::new(5, false).unwrap();

    let result = ForecastService::for_series(&model, &series)
        .forecast(&request)
        .unwrap();

    assert_eq!(result.first_date(), Some(date(2024, 1, 1)));
}

#[test]
fn test_trait_object_model() {
    let model: Box<dyn FittedModel> = Box::new(random_walk(100.0));
    let service = ForecastService::new(model.as_ref(), date(2024, 1, 5));
    let request = ForecastRequest::new(2, true).unwrap();

    let result = service.forecast(&request).unwrap();
    assert_eq!(result.dates(), vec![date(2024, 1, 8), date(2024, 1, 9)]);
}
