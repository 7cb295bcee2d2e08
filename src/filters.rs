//! Slicing transactions by date range, month bucket and week bucket.
//!
//! Every filter returns a new `Transactions` with the same headers, holding the matching rows in
//! their original order.

use crate::buckets::WeekStart;
use crate::model::Transactions;
use crate::Result;
use chrono::NaiveDate;

/// Rows with `start <= date <= end`. Both bounds are inclusive; an inverted range matches nothing.
pub fn get_dates(transactions: &Transactions, start: NaiveDate, end: NaiveDate) -> Transactions {
    transactions.with_data(
        transactions
            .iter()
            .filter(|t| t.date() >= start && t.date() <= end)
            .cloned()
            .collect(),
    )
}

/// Rows whose month bucket is exactly `month`. Since buckets are always the first of a month, any
/// other date matches nothing.
pub fn get_month(transactions: &Transactions, month: NaiveDate) -> Transactions {
    transactions.with_data(
        transactions
            .iter()
            .filter(|t| t.month() == month)
            .cloned()
            .collect(),
    )
}

/// Rows whose week bucket starts on `week`, given as `YYYY-MM-DD`.
///
/// # Errors
/// - `NotMonday` if `week` is a valid date that is not a Monday.
/// - A parse error if `week` is not a date.
pub fn get_week(transactions: &Transactions, week: &str) -> Result<Transactions> {
    let week: WeekStart = week.parse()?;
    Ok(get_week_start(transactions, week))
}

/// Rows in the week that starts on `week`.
pub fn get_week_start(transactions: &Transactions, week: WeekStart) -> Transactions {
    transactions.with_data(
        transactions
            .iter()
            .filter(|t| t.week_start() == week.date())
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotMonday;
    use crate::model::{Amount, Transaction};
    use chrono::Days;
    use rust_decimal::Decimal;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// One row per day from 2023-12-25 through 2024-02-10.
    fn daily() -> Transactions {
        let first = d(2023, 12, 25);
        let rows = (0..48u64)
            .map(|n| {
                Transaction::new(
                    first + Days::new(n),
                    if n % 2 == 0 { "Food" } else { "Rent" },
                    Amount::new(Decimal::from(n)),
                )
            })
            .collect::<Vec<_>>();
        Transactions::default().with_data(rows)
    }

    #[test]
    fn test_get_dates_inclusive() {
        let transactions = daily();
        let ranges = [
            (d(2024, 1, 1), d(2024, 1, 1)),
            (d(2024, 1, 1), d(2024, 1, 31)),
            (d(2023, 1, 1), d(2023, 12, 26)),
            (d(2024, 2, 9), d(2025, 1, 1)),
        ];
        for (start, end) in ranges {
            let found = get_dates(&transactions, start, end);
            assert!(found.iter().all(|t| start <= t.date() && t.date() <= end));
            let expected = transactions
                .iter()
                .filter(|t| start <= t.date() && t.date() <= end)
                .count();
            assert_eq!(found.len(), expected);
            assert!(found.iter().any(|t| t.date() == start) || start < d(2023, 12, 25));
            assert!(found.iter().any(|t| t.date() == end) || end > d(2024, 2, 10));
        }
        assert_eq!(get_dates(&transactions, d(2024, 1, 1), d(2024, 1, 31)).len(), 31);
    }

    #[test]
    fn test_get_dates_inverted_range_is_empty() {
        let found = get_dates(&daily(), d(2024, 1, 31), d(2024, 1, 1));
        assert!(found.is_empty());
    }

    #[test]
    fn test_get_month() {
        let transactions = daily();
        let january = get_month(&transactions, d(2024, 1, 1));
        assert_eq!(january.len(), 31);
        assert!(january.iter().all(|t| t.month() == d(2024, 1, 1)));
        assert!(get_month(&transactions, d(2024, 1, 15)).is_empty());
    }

    #[test]
    fn test_get_week() {
        let transactions = daily();
        for week in ["2023-12-25", "2024-01-01", "2024-01-08", "2024-02-05"] {
            let found = get_week(&transactions, week).unwrap();
            let monday = NaiveDate::parse_from_str(week, "%Y-%m-%d").unwrap();
            assert!(!found.is_empty());
            assert!(found.iter().all(|t| t.week_start() == monday));
        }
        assert_eq!(get_week(&transactions, "2024-01-08").unwrap().len(), 7);
    }

    #[test]
    fn test_get_week_not_monday() {
        let err = get_week(&daily(), "2024-01-10").unwrap_err();
        let not_monday = err.downcast_ref::<NotMonday>().unwrap();
        assert_eq!(not_monday.date(), d(2024, 1, 10));
        assert!(err.to_string().contains("was not a Monday"));
    }

    #[test]
    fn test_filters_keep_headers() {
        let transactions = Transactions::parse(
            vec![
                vec!["Date", "Type", "Amount", "Note"],
                vec!["2024-01-05", "Food", "10", "x"],
            ],
            None,
        )
        .unwrap();
        let found = get_month(&transactions, d(2024, 1, 1));
        assert_eq!(found.headers(), transactions.headers());
        assert_eq!(found.len(), 1);
    }
}
