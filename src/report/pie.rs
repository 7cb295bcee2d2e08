//! The current month's spending by category, shaped as a donut chart.

use crate::buckets;
use crate::model::{Amount, Transactions};
use chrono::{DateTime, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fraction of the radius left empty in the middle of the donut.
pub const HOLE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    label: String,
    amount: Amount,
    /// Fraction of the chart, in `0.0..=1.0`, taken from absolute values.
    share: f64,
}

impl Slice {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The signed sum for the category.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn share(&self) -> f64 {
        self.share
    }

    /// The share as a rounded percentage.
    pub fn percent(&self) -> u32 {
        (self.share * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    month: NaiveDate,
    slices: Vec<Slice>,
    total: Amount,
    hole: f64,
}

impl PieChart {
    /// The first day of the month the chart covers.
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    /// Slices in alphabetical order of their labels.
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// The signed sum of every slice.
    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn hole(&self) -> f64 {
        self.hole
    }

    /// Text shown in the middle of the donut.
    pub fn center_label(&self) -> String {
        self.total.to_string()
    }

    pub fn title(&self) -> String {
        format!("Spending for {}", self.month.format("%B %Y"))
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Builds the donut for the month containing `now`, covering the first of that month through the
/// date of `now`.
pub fn create_pie_chart<Tz: TimeZone>(transactions: &Transactions, now: &DateTime<Tz>) -> PieChart {
    let today = now.date_naive();
    let month = buckets::month_start(today);

    let mut sums: BTreeMap<&str, Amount> = BTreeMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.date() >= month && t.date() <= today)
    {
        *sums.entry(t.category()).or_default() += t.amount();
    }
    sums.retain(|_, amount| !amount.is_zero());

    let total: Amount = sums.values().sum();
    let magnitude: Decimal = sums.values().map(|a| a.abs().value()).sum();
    let slices = sums
        .into_iter()
        .map(|(label, amount)| Slice {
            label: label.to_string(),
            amount,
            share: share(amount.abs().value(), magnitude),
        })
        .collect();

    PieChart {
        month,
        slices,
        total,
        hole: HOLE,
    }
}

fn share(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    Amount::new(part / whole).to_f64()
}
