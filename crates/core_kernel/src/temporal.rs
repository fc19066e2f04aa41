//! Calendar arithmetic for monthly schedules
//!
//! Loan schedules are indexed by month, not by day: a payment day of 31
//! lands on the 30th in April and on the 28th or 29th in February. This
//! module provides the month shifting and clamping those schedules rely
//! on, plus a `Clock` abstraction so "today" can be injected.

use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Invalid day of month: {0}")]
    InvalidDayOfMonth(u32),

    #[error("Date out of supported range: {0}")]
    OutOfRange(String),
}

/// Returns the number of days in the given month
///
/// Returns 0 for a month outside 1..=12 or a year chrono cannot represent.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(next) => (next - first).num_days() as u32,
        // December of chrono's last representable year
        None => 31,
    }
}

/// Shifts a (year, month) pair forward by `offset` months
pub fn shift_month(year: i32, month: u32, offset: u32) -> Option<(i32, u32)> {
    let zero_based = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(offset);
    let shifted_year = i32::try_from(zero_based.div_euclid(12)).ok()?;
    let shifted_month = (zero_based.rem_euclid(12) + 1) as u32;
    Some((shifted_year, shifted_month))
}

/// Date of the payment `offset` months after `start`'s month.
///
/// `day` is clamped to the length of the target month. Offset 0 stays in
/// `start`'s own month even when `day` precedes `start.day()`.
///
/// Returns `None` when the target month is outside chrono's range.
pub fn monthly_due_date(start: NaiveDate, offset: u32, day: u32) -> Option<NaiveDate> {
    let (year, month) = shift_month(start.year(), start.month(), offset)?;
    let last_day = days_in_month(year, month);
    if last_day == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last_day))
}

/// Validates a payment day of month (1..=31)
pub fn validate_payment_day(day: u32) -> Result<u32, TemporalError> {
    if (1..=31).contains(&day) {
        Ok(day)
    } else {
        Err(TemporalError::InvalidDayOfMonth(day))
    }
}

/// An inclusive date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The range `[from, from + days]`
    pub fn days_ahead(from: NaiveDate, days: u32) -> Result<Self, TemporalError> {
        let end = from
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| TemporalError::OutOfRange(format!("{} + {} days", from, days)))?;
        Ok(Self { start: from, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Source of the current calendar date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system time (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
