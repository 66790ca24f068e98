//! The month window used to filter every listing and summary query.

use crate::error::{Error, ErrorType};
use crate::Result;
use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive date range covering exactly one calendar month, from the 1st through the true last
/// day of that month (e.g. `2024-02-01..=2024-02-29`).
///
/// Expense dates are stored as `YYYY-MM-DD` text, so the window is applied as a string comparison
/// against `start()` and `end()`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MonthWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl MonthWindow {
    /// The month containing today's date in the local time zone.
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        // Every valid date has a valid 1st of its month.
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// The month `year`-`month`, if `month` is in `1..=12`.
    pub fn for_month(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self::containing)
            .ok_or_else(|| {
                Error::msg(
                    ErrorType::InvalidInput,
                    format!("{year:04}-{month:02} is not a valid month"),
                )
            })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end
    }

    /// The first day of the month as `YYYY-MM-01`.
    pub fn start(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// The last day of the month as `YYYY-MM-DD`.
    pub fn end(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    /// Whether a stored date string falls in the window, using the same comparison as the store.
    pub fn contains(&self, date: &str) -> bool {
        let (start, end) = (self.start(), self.end());
        start.as_str() <= date && date <= end.as_str()
    }
}

impl Display for MonthWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start.format("%Y-%m"))
    }
}

impl FromStr for MonthWindow {
    type Err = Error;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || {
            Error::msg(
                ErrorType::InvalidInput,
                format!("Expected a month formatted as YYYY-MM, got '{s}'"),
            )
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::for_month(year, month)
    }
}
