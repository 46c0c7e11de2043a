//! Calendar month handling for reports.
//!
//! A [`Month`] is parsed from a `YYYY-MM` token and maps to the half-open UTC
//! interval `[first instant of the month, first instant of the next month)`.
//! Callers filter with `occurred_at >= start AND occurred_at < end`.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Month {
    year: i32,
    /// Zero-based month index (0 = January).
    month0: u32,
}

impl Month {
    /// Builds a month from a year and a one-based month number (1-12).
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidMonth(format!(
                "month out of range: {month}"
            )));
        }
        Ok(Self {
            year,
            month0: month - 1,
        })
    }

    /// Parses a `YYYY-MM` token.
    ///
    /// Rejects non-numeric components and month numbers outside 1-12; the
    /// token is never silently corrected.
    pub fn parse(token: &str) -> ResultEngine<Self> {
        let invalid = || {
            EngineError::InvalidMonth(format!("invalid month '{token}': expected YYYY-MM"))
        };

        let (year_str, month_str) = token.trim().split_once('-').ok_or_else(invalid)?;
        if year_str.is_empty()
            || year_str.len() > 4
            || !year_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if month_str.is_empty()
            || month_str.len() > 2
            || !month_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    /// The current calendar month, from the system clock (UTC).
    #[must_use]
    pub fn current() -> Self {
        let now = Utc::now();
        Self {
            year: now.year(),
            month0: now.month0(),
        }
    }

    /// Returns the half-open UTC interval `[start, end)` covered by this
    /// month.
    pub fn range(self) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        let out_of_range =
            || EngineError::InvalidMonth(format!("month out of calendar range: {self}"));

        let start = first_instant(self.year, self.month0).ok_or_else(out_of_range)?;
        let (next_year, next_month0) = if self.month0 == 11 {
            (self.year + 1, 0)
        } else {
            (self.year, self.month0 + 1)
        };
        let end = first_instant(next_year, next_month0).ok_or_else(out_of_range)?;
        Ok((start, end))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month0 + 1)
    }
}

fn first_instant(year: i32, month0: u32) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month0 + 1, 1)?;
    Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_tokens() {
        assert_eq!(Month::parse("2025-02").unwrap(), Month::new(2025, 2).unwrap());
        assert_eq!(Month::parse("2025-2").unwrap(), Month::new(2025, 2).unwrap());
        assert_eq!(Month::parse("2025-12").unwrap(), Month::new(2025, 12).unwrap());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(Month::parse("2025-13").is_err());
        assert!(Month::parse("2025-00").is_err());
        assert!(Month::parse("2025").is_err());
        assert!(Month::parse("20a5-02").is_err());
        assert!(Month::parse("2025-xx").is_err());
        assert!(Month::parse("").is_err());
    }

    #[test]
    fn range_is_half_open_month() {
        let (start, end) = Month::new(2025, 1).unwrap().range().unwrap();
        assert_eq!(start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-02-01T00:00:00+00:00");
    }

    #[test]
    fn december_rolls_over_to_next_year() {
        let (start, end) = Month::new(2024, 12).unwrap().range().unwrap();
        assert_eq!(start.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn display_pads_components() {
        assert_eq!(Month::new(2025, 2).unwrap().to_string(), "2025-02");
        assert_eq!(Month::parse("2025-2").unwrap().to_string(), "2025-02");
    }
}
