use chrono::NaiveDate;
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when a week is requested by a date that does not fall on a Monday. Weeks are always
/// identified by the Monday that starts them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NotMonday(NaiveDate);

impl NotMonday {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The date that was rejected.
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl Display for NotMonday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "week of {} was not a Monday (it was a {})",
            self.0.format("%Y-%m-%d"),
            self.0.format("%A")
        )
    }
}

impl std::error::Error for NotMonday {}
