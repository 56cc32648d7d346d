use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The dates the user picked for the history filter did not form a range.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DateRangeError(usize);

impl Display for DateRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Please pick a valid date range: one date or two dates, got {}",
            self.0
        )
    }
}

impl std::error::Error for DateRangeError {}

/// An inclusive range of dates for filtering the expense history.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range covering only `date`.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// Interprets the dates picked in a date range input: two dates are the start and end, one
    /// date is a single day. The dates are not reordered, so a start after the end gives a range
    /// that matches nothing.
    pub fn from_picks(picks: &[NaiveDate]) -> Result<Self, DateRangeError> {
        match picks {
            [day] => Ok(Self::day(*day)),
            [start, end] => Ok(Self::new(*start, *end)),
            other => Err(DateRangeError(other.len())),
        }
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} s/d {}",
            self.start.format("%d-%b-%Y"),
            self.end.format("%d-%b-%Y")
        )
    }
}
