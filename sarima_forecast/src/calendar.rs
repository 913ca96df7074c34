//! Business-day calendar
//!
//! A business day is Monday through Friday. Holidays are not excluded, so
//! New Year's Day counts as a business day when it falls on a weekday.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Whether `date` falls on a weekday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First business day strictly after `date`
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    roll_forward(date + Duration::days(1))
}

/// `date` itself if it is a business day, otherwise the following Monday
pub fn roll_forward(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

/// `count` consecutive business days starting the day after `last`
pub fn business_days_after(last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut current = last;
    for _ in 0..count {
        current = next_business_day(current);
        days.push(current);
    }
    days
}

/// Every business day in `[start, end]`
pub fn business_day_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = roll_forward(start);
    while current <= end {
        days.push(current);
        current = next_business_day(current);
    }
    days
}
