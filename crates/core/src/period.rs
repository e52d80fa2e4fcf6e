//! Billing period: a calendar month of a calendar year.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a billing period.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// Month outside 1..=12.
    #[error("invalid month {0}, expected 1..=12")]
    InvalidMonth(u32),

    /// Year outside the supported range.
    #[error("invalid year {0}, expected 1..=9999")]
    InvalidYear(i32),
}

/// A (year, month) pair identifying one billing cycle.
///
/// Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// Creates a validated billing period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError` if the month is not 1..=12 or the year is not 1..=9999.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        if !(1..=9999).contains(&year) {
            return Err(PeriodError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// Builds a period from raw integer columns, rejecting negative months.
    ///
    /// # Errors
    ///
    /// Same as [`BillingPeriod::new`].
    pub fn from_parts(year: i32, month: i32) -> Result<Self, PeriodError> {
        let month = u32::try_from(month).map_err(|_| PeriodError::InvalidMonth(0))?;
        Self::new(year, month)
    }

    /// The period containing the given date.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month, 1..=12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Month as the signed integer stored in period columns.
    #[must_use]
    pub fn month_i32(self) -> i32 {
        // month is always 1..=12
        i32::try_from(self.month).unwrap_or(1)
    }

    /// First day of the period.
    #[must_use]
    pub fn start(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the period.
    #[must_use]
    pub fn end(self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Returns true if the date falls inside the period.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end()
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
