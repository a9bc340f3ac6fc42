//! Calendar primitives used by the rate lookups

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Earliest date the quotation service is queried for.
pub const MIN_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(date) => date,
    None => panic!("invalid minimum date"),
};

/// Source of "today". Injected so that date walks are reproducible.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn subtract_days(date: NaiveDate, n: u64) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(n))
        .ok_or_else(|| anyhow!("Date out of range: {} minus {} days", date, n))
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `yyyy/MM/dd`, as used in the quotation service paths.
pub fn format_path(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

pub fn parse_iso(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse date: {date_str}"))
}

/// Walks backward from the day before `today`, collecting up to `count` weekdays.
///
/// The walk stops early once it would step below `min_date`, so `count` may be
/// arbitrarily large. Days are returned most recent first.
pub fn business_days_back(
    today: NaiveDate,
    count: usize,
    min_date: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    let mut days = Vec::new();
    let mut cursor = today;

    while days.len() < count {
        cursor = subtract_days(cursor, 1)?;
        if cursor < min_date {
            break;
        }
        if !is_weekend(cursor) {
            days.push(cursor);
        }
    }

    Ok(days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRejection {
    Future,
    BeforeMinimum,
}

/// Checks that `date` can be picked: not after `today` and not before `min_date`.
pub fn check_selectable(
    date: NaiveDate,
    today: NaiveDate,
    min_date: NaiveDate,
) -> std::result::Result<NaiveDate, DateRejection> {
    if date > today {
        Err(DateRejection::Future)
    } else if date < min_date {
        Err(DateRejection::BeforeMinimum)
    } else {
        Ok(date)
    }
}
