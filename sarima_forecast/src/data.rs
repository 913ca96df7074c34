//! Historical price loading and cleaning
//!
//! The loader turns a raw price CSV into a [`CleanedSeries`]: one closing
//! price per business day with no gaps. Along the way it computes simple and
//! log returns and caps both at their Tukey fences.

use crate::calendar::{business_day_range, is_business_day, next_business_day};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use series_math::{forward_fill, log_returns, simple_returns, TukeyFence};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One row of the raw price file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: Option<u64>,
}

/// Capped returns for one row; the first row has neither return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub date: NaiveDate,
    pub simple_return: Option<f64>,
    pub log_return: Option<f64>,
}

/// Closing prices on a gap-free business-day calendar
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Everything the loader derives from a price file
#[derive(Debug, Clone)]
pub struct HistoricalData {
    /// Rows sorted by date, one per date
    pub records: Vec<PriceRecord>,
    /// Capped returns aligned with `records`
    pub returns: Vec<ReturnRecord>,
    /// Fence applied to simple returns, if any return could be computed
    pub return_fence: Option<TukeyFence>,
    /// Fence applied to log returns, if any return could be computed
    pub log_return_fence: Option<TukeyFence>,
    /// Working series handed to the forecast service
    pub series: CleanedSeries,
}

impl CleanedSeries {
    /// Build a series from dates and values that already sit on consecutive
    /// business days.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.is_empty() {
            return Err(ForecastError::DataError(
                "Cleaned series must not be empty".to_string(),
            ));
        }
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        if let Some(date) = dates.iter().find(|d| !is_business_day(**d)) {
            return Err(ForecastError::DataError(format!(
                "{} is not a business day",
                date
            )));
        }
        for pair in dates.windows(2) {
            if next_business_day(pair[0]) != pair[1] {
                return Err(ForecastError::DataError(format!(
                    "Gap in business-day index between {} and {}",
                    pair[0], pair[1]
                )));
            }
        }

        Ok(Self { dates, values })
    }

    /// Reindex dated observations onto every business day between the first
    /// and last observed business date, carrying the last price forward.
    ///
    /// Observations on weekends are not part of the calendar and are dropped.
    pub fn from_observations(observations: &[(NaiveDate, f64)]) -> Result<Self> {
        let on_calendar: BTreeMap<NaiveDate, f64> = observations
            .iter()
            .filter(|(date, _)| is_business_day(*date))
            .copied()
            .collect();

        let weekend = observations.len() - on_calendar.len();
        if weekend > 0 {
            debug!("Dropped {} observation(s) outside the business-day calendar", weekend);
        }

        let (start, end) = match (on_calendar.keys().next(), on_calendar.keys().next_back()) {
            (Some(start), Some(end)) => (*start, *end),
            _ => {
                return Err(ForecastError::DataError(
                    "No observations fall on a business day".to_string(),
                ))
            }
        };

        let dates = business_day_range(start, end);
        let sparse: Vec<Option<f64>> = dates.iter().map(|d| on_calendar.get(d).copied()).collect();
        let filled = forward_fill(&sparse)
            .into_iter()
            .zip(dates.iter())
            .map(|(value, date)| {
                value.ok_or_else(|| {
                    ForecastError::DataError(format!("No value to carry forward on {}", date))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let filled_days = sparse.iter().filter(|v| v.is_none()).count();
        if filled_days > 0 {
            debug!("Forward-filled {} business day(s)", filled_days);
        }

        Self::new(dates, filled)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false; an empty series cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn last_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Iterate over `(date, close)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// The last `n` entries, or the whole series if it is shorter
    pub fn tail(&self, n: usize) -> Vec<(NaiveDate, f64)> {
        let start = self.len().saturating_sub(n);
        self.iter().skip(start).collect()
    }
}

/// Data loader for historical price files
#[derive(Debug)]
pub struct DataLoader;

/// Column positions found in the header row
#[derive(Debug, Default)]
struct Columns {
    date: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    adj_close: Option<usize>,
    volume: Option<usize>,
}

impl DataLoader {
    /// Load a price file and return its cleaned business-day series
    pub fn load<P: AsRef<Path>>(path: P) -> Result<CleanedSeries> {
        Ok(Self::load_history(path)?.series)
    }

    /// Load a price file and return records, capped returns and the series
    pub fn load_history<P: AsRef<Path>>(path: P) -> Result<HistoricalData> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::DataError(format!("Failed to open '{}': {}", path.display(), e))
        })?;

        let history = Self::from_reader(file)?;
        info!(
            "Loaded {} price rows from '{}' ({} business days, {} to {})",
            history.records.len(),
            path.display(),
            history.series.len(),
            history.series.first_date(),
            history.series.last_date()
        );

        Ok(history)
    }

    /// Parse and clean price data from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<HistoricalData> {
        let records = Self::read_records(reader)?;
        Self::from_records(records)
    }

    /// Run the cleaning pipeline on already parsed records
    pub fn from_records(mut records: Vec<PriceRecord>) -> Result<HistoricalData> {
        if records.is_empty() {
            return Err(ForecastError::DataError(
                "No rows with a parseable date".to_string(),
            ));
        }

        records.sort_by_key(|r| r.date);
        let records = Self::dedup_dates(records);

        let closes: Vec<f64> = records.iter().map(|r| r.close).collect();
        let (return_fence, simple) = Self::capped(simple_returns(&closes))?;
        let (log_return_fence, log) = Self::capped(log_returns(&closes))?;

        let returns = records
            .iter()
            .zip(simple.into_iter().zip(log))
            .map(|(record, (simple_return, log_return))| ReturnRecord {
                date: record.date,
                simple_return,
                log_return,
            })
            .collect();

        let observations: Vec<(NaiveDate, f64)> =
            records.iter().map(|r| (r.date, r.close)).collect();
        let series = CleanedSeries::from_observations(&observations)?;

        Ok(HistoricalData {
            records,
            returns,
            return_fence,
            log_return_fence,
            series,
        })
    }

    fn capped(values: Vec<Option<f64>>) -> Result<(Option<TukeyFence>, Vec<Option<f64>>)> {
        if values.iter().all(|v| v.is_none()) {
            return Ok((None, values));
        }

        let fence = TukeyFence::from_values(&values)?;
        let capped = fence.clip(&values);
        Ok((Some(fence), capped))
    }

    /// Keep the last row for each date; input must be sorted by date
    fn dedup_dates(records: Vec<PriceRecord>) -> Vec<PriceRecord> {
        let total = records.len();
        let mut unique: Vec<PriceRecord> = Vec::with_capacity(total);
        for record in records {
            match unique.last_mut() {
                Some(last) if last.date == record.date => *last = record,
                _ => unique.push(record),
            }
        }

        if unique.len() < total {
            warn!(
                "Collapsed {} duplicate date row(s), keeping the last occurrence",
                total - unique.len()
            );
        }

        unique
    }

    fn read_records<R: Read>(reader: R) -> Result<Vec<PriceRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ForecastError::DataError(format!("Failed to read header row: {}", e)))?
            .clone();
        let columns = Self::detect_columns(&headers);
        let (date_idx, close_idx) = match (columns.date, columns.close) {
            (Some(date), Some(close)) => (date, close),
            (None, _) => {
                return Err(ForecastError::DataError(
                    "No 'Date' column found in data".to_string(),
                ))
            }
            (_, None) => {
                return Err(ForecastError::DataError(
                    "No 'Close' column found in data".to_string(),
                ))
            }
        };

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for (i, row) in csv_reader.records().enumerate() {
            let line = i + 2;
            let row = row.map_err(|e| {
                ForecastError::DataError(format!("Error reading line {}: {}", line, e))
            })?;

            let raw_date = row.get(date_idx).unwrap_or("");
            let Some(date) = parse_day_first(raw_date) else {
                warn!("Dropping line {}: unparseable date '{}'", line, raw_date);
                dropped += 1;
                continue;
            };

            let Some(close) = parse_price(row.get(close_idx)) else {
                warn!("Dropping line {}: missing or invalid close price", line);
                dropped += 1;
                continue;
            };

            records.push(PriceRecord {
                date,
                open: columns.open.and_then(|idx| parse_price(row.get(idx))),
                high: columns.high.and_then(|idx| parse_price(row.get(idx))),
                low: columns.low.and_then(|idx| parse_price(row.get(idx))),
                close,
                adj_close: columns.adj_close.and_then(|idx| parse_price(row.get(idx))),
                volume: columns.volume.and_then(|idx| parse_volume(row.get(idx))),
            });
        }

        if dropped > 0 {
            warn!("Dropped {} row(s) during date and price filtering", dropped);
        }

        Ok(records)
    }

    fn detect_columns(headers: &csv::StringRecord) -> Columns {
        let mut columns = Columns::default();
        for (idx, name) in headers.iter().enumerate() {
            let normalized = normalize_column(name);
            let slot = match normalized.as_str() {
                "date" => &mut columns.date,
                "open" => &mut columns.open,
                "high" => &mut columns.high,
                "low" => &mut columns.low,
                "close" => &mut columns.close,
                "adj_close" => &mut columns.adj_close,
                "volume" => &mut columns.volume,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }

        columns
    }
}

/// Lowercase a header and rename `Adj Close` to `adj_close`
fn normalize_column(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .replace(' ', "_")
}

fn parse_price(field: Option<&str>) -> Option<f64> {
    field
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_volume(field: Option<&str>) -> Option<u64> {
    let field = field?;
    field.parse::<u64>().ok().or_else(|| {
        field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
    })
}

const YEAR_FIRST_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DAY_FIRST_FORMATS: [&str; 5] = [
    "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%d-%b-%Y", "%d/%b/%Y",
];
const DAY_FIRST_SHORT_YEAR_FORMATS: [&str; 3] = ["%d-%m-%y", "%d/%m/%y", "%d.%m.%y"];

/// Parse a date written day-first.
///
/// ISO dates (four-digit year first) are unambiguous and accepted as is. Any
/// time-of-day suffix is ignored. Returns `None` when nothing matches.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let token = raw.split_whitespace().next()?;
    let token = strip_iso_time(token);

    let bytes = token.as_bytes();
    let year_first = bytes.len() > 4
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && matches!(bytes[4], b'-' | b'/');

    let formats: &[&str] = if year_first {
        &YEAR_FIRST_FORMATS
    } else {
        let year_digits = token
            .rsplit(['-', '/', '.'])
            .next()
            .map(str::len)
            .unwrap_or(0);
        match year_digits {
            2 => &DAY_FIRST_SHORT_YEAR_FORMATS,
            4 => &DAY_FIRST_FORMATS,
            _ => return None,
        }
    };

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

/// `2023-12-29T00:00:00` -> `2023-12-29`
fn strip_iso_time(token: &str) -> &str {
    match token.find('T') {
        Some(idx)
            if idx >= 8
                && token[..idx]
                    .chars()
                    .all(|c| c.is_ascii_digit() || c == '-' || c == '/') =>
        {
            &token[..idx]
        }
        _ => token,
    }
}
