//! Synthetic price data for trying the tool without a real export

use chrono::NaiveDate;
use rand::Rng;
use sarima_forecast::calendar::{next_business_day, roll_forward};
use sarima_forecast::PriceRecord;
use std::io::Write;

/// Random-walk daily bars on consecutive business days starting at `start`
pub fn synthetic_prices<R: Rng>(
    rng: &mut R,
    start: NaiveDate,
    days: usize,
    base_price: f64,
    volatility: f64,
) -> Vec<PriceRecord> {
    let mut records = Vec::with_capacity(days);
    let mut date = roll_forward(start);
    let mut close = base_price;

    for _ in 0..days {
        let open = close;
        let change = rng.gen_range(-volatility..=volatility) + volatility * 0.05;
        close = (open * (1.0 + change)).max(0.01);
        let spread = open.max(close) * rng.gen_range(0.0..=volatility / 2.0);

        records.push(PriceRecord {
            date,
            open: Some(open),
            high: Some(open.max(close) + spread),
            low: Some((open.min(close) - spread).max(0.01)),
            close,
            adj_close: Some(close),
            volume: Some(rng.gen_range(40_000_000..120_000_000)),
        });
        date = next_business_day(date);
    }

    records
}

/// Write records in the day-first layout the loader expects
pub fn write_price_csv<W: Write>(records: &[PriceRecord], writer: W) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"])?;

    let optional = |v: Option<f64>| v.map(|x| format!("{:.4}", x)).unwrap_or_default();
    for r in records {
        csv_writer.write_record([
            r.date.format("%d-%m-%Y").to_string(),
            optional(r.open),
            optional(r.high),
            optional(r.low),
            format!("{:.4}", r.close),
            optional(r.adj_close),
            r.volume.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
