//! Calendar buckets: the month and the Monday-anchored week that a date belongs to.

use crate::error::NotMonday;
use crate::Result;
use anyhow::{bail, Context};
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Format used for the short month labels in table headers, e.g. `Jan'24`.
const MONTH_LABEL: &str = "%b'%y";

/// The first day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The Monday that starts the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// The first day of the month `n` months before the month containing `date`.
pub fn months_back(date: NaiveDate, n: u32) -> NaiveDate {
    month_start(date)
        .checked_sub_months(Months::new(n))
        .unwrap_or(NaiveDate::MIN)
}

/// The first day of the month `n` months after the month containing `date`.
pub fn add_months(date: NaiveDate, n: u32) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(n))
        .unwrap_or(NaiveDate::MAX)
}

/// Short label for a month bucket, e.g. `Jan'24`.
pub fn month_label(month: NaiveDate) -> String {
    month.format(MONTH_LABEL).to_string()
}

/// Parses a month given as `YYYY-MM` or as the first day of the month, `YYYY-MM-01`.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if date.day() != 1 {
            bail!("'{s}' is not the first day of a month");
        }
        return Ok(date);
    }
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .with_context(|| format!("Unable to parse '{s}' as a month, expected YYYY-MM"))
}

/// A week, identified by the Monday that starts it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct WeekStart(NaiveDate);

impl WeekStart {
    /// Fails with `NotMonday` unless `date` is a Monday.
    pub fn new(date: NaiveDate) -> std::result::Result<Self, NotMonday> {
        if date.weekday() == Weekday::Mon {
            Ok(Self(date))
        } else {
            Err(NotMonday::new(date))
        }
    }

    /// The week that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self(week_start(date))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl TryFrom<NaiveDate> for WeekStart {
    type Error = NotMonday;

    fn try_from(value: NaiveDate) -> std::result::Result<Self, Self::Error> {
        WeekStart::new(value)
    }
}

impl From<WeekStart> for NaiveDate {
    fn from(value: WeekStart) -> Self {
        value.0
    }
}

impl FromStr for WeekStart {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("Unable to parse week '{s}', expected YYYY-MM-DD"))?;
        Ok(WeekStart::new(date)?)
    }
}

impl Display for WeekStart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_start() {
        assert_eq!(month_start(d(2024, 2, 29)), d(2024, 2, 1));
        assert_eq!(month_start(d(2024, 1, 1)), d(2024, 1, 1));
    }

    #[test]
    fn test_week_start() {
        // 2024-01-01 was a Monday.
        assert_eq!(week_start(d(2024, 1, 1)), d(2024, 1, 1));
        assert_eq!(week_start(d(2024, 1, 7)), d(2024, 1, 1));
        assert_eq!(week_start(d(2024, 1, 8)), d(2024, 1, 8));
        // A week can start in the previous year.
        assert_eq!(week_start(d(2025, 1, 1)), d(2024, 12, 30));
    }

    #[test]
    fn test_months_back() {
        assert_eq!(months_back(d(2024, 3, 15), 0), d(2024, 3, 1));
        assert_eq!(months_back(d(2024, 3, 15), 3), d(2023, 12, 1));
    }

    #[test]
    fn test_add_months() {
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 1));
        assert_eq!(add_months(d(2024, 11, 2), 2), d(2025, 1, 1));
        assert_eq!(months_back(add_months(d(2024, 5, 9), 7), 7), d(2024, 5, 1));
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(d(2024, 1, 1)), "Jan'24");
        assert_eq!(month_label(d(2025, 10, 1)), "Oct'25");
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-02").unwrap(), d(2024, 2, 1));
        assert_eq!(parse_month("2024-02-01").unwrap(), d(2024, 2, 1));
        assert!(parse_month("2024-02-15").is_err());
        assert!(parse_month("Feb").is_err());
    }

    #[test]
    fn test_week_start_requires_monday() {
        assert!(WeekStart::new(d(2024, 1, 1)).is_ok());
        let err = WeekStart::new(d(2024, 1, 2)).unwrap_err();
        assert_eq!(err.date(), d(2024, 1, 2));
    }

    #[test]
    fn test_week_start_from_str() {
        let week: WeekStart = "2024-01-08".parse().unwrap();
        assert_eq!(week.date(), d(2024, 1, 8));
        assert_eq!(week.to_string(), "2024-01-08");

        let err = "2024-01-09".parse::<WeekStart>().unwrap_err();
        assert!(err.downcast_ref::<NotMonday>().is_some());

        let err = "not a date".parse::<WeekStart>().unwrap_err();
        assert!(err.downcast_ref::<NotMonday>().is_none());
    }

    #[test]
    fn test_week_start_serde() {
        let json = serde_json::to_string(&WeekStart::containing(d(2024, 1, 10))).unwrap();
        assert_eq!(json, "\"2024-01-08\"");
        assert!(serde_json::from_str::<WeekStart>("\"2024-01-10\"").is_err());
    }
}
