//! The monthly spending table: categories down the side, months across the top.

use crate::buckets;
use crate::filters;
use crate::model::{Amount, Transactions};
use chrono::{DateTime, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// How many months the table covers when nothing else is configured.
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 4;

/// Label of the synthetic totals row and column.
pub const TOTAL: &str = "Total";

/// Label of the header cell above the category labels.
pub const CATEGORY_HEADER: &str = "Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    lookback_months: u32,
    reverse: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            reverse: false,
        }
    }
}

impl TableOptions {
    /// `lookback_months` is clamped to at least one month.
    pub fn new(lookback_months: u32, reverse: bool) -> Self {
        Self {
            lookback_months: lookback_months.max(1),
            reverse,
        }
    }

    pub fn lookback_months(&self) -> u32 {
        self.lookback_months
    }

    /// When true, months run newest-first.
    pub fn reverse(&self) -> bool {
        self.reverse
    }
}

/// How a cell compares with the cell to its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    /// Greater than its left neighbour.
    Increase,
    /// Smaller than its left neighbour.
    Decrease,
    /// Equal to its left neighbour, or not compared at all.
    Neutral,
    /// The leftmost month cell, which has nothing to compare with.
    Highlighted,
}

serde_plain::derive_display_from_serialize!(CellStyle);

/// The colour family a renderer should use for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Red.
    Warning,
    /// Green.
    Favorable,
    Neutral,
    Edge,
}

impl CellStyle {
    /// Maps the comparison to a colour. In chronological order an increase means spending went up,
    /// which is a warning. When the columns are reversed the left neighbour is the newer month, so
    /// the polarity flips.
    pub fn tone(self, reverse: bool) -> Tone {
        match (self, reverse) {
            (CellStyle::Increase, false) | (CellStyle::Decrease, true) => Tone::Warning,
            (CellStyle::Decrease, false) | (CellStyle::Increase, true) => Tone::Favorable,
            (CellStyle::Neutral, _) => Tone::Neutral,
            (CellStyle::Highlighted, _) => Tone::Edge,
        }
    }
}

/// Styles a row of values by comparing each value with its immediate left neighbour. The first
/// value is always `Highlighted`.
pub fn highlight_row(values: &[Decimal]) -> Vec<CellStyle> {
    values
        .iter()
        .enumerate()
        .map(|(ix, value)| match ix.checked_sub(1).map(|left| &values[left]) {
            None => CellStyle::Highlighted,
            Some(left) => match value.cmp(left) {
                Ordering::Greater => CellStyle::Increase,
                Ordering::Less => CellStyle::Decrease,
                Ordering::Equal => CellStyle::Neutral,
            },
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "month")]
pub enum ColumnKind {
    Month(NaiveDate),
    Total,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    label: String,
    kind: ColumnKind,
}

impl Column {
    fn month(month: NaiveDate) -> Self {
        Self {
            label: buckets::month_label(month),
            kind: ColumnKind::Month(month),
        }
    }

    fn total() -> Self {
        Self {
            label: TOTAL.to_string(),
            kind: ColumnKind::Total,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_total(&self) -> bool {
        self.kind == ColumnKind::Total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    amount: Amount,
    text: String,
    style: CellStyle,
}

impl Cell {
    fn new(amount: Amount, style: CellStyle) -> Self {
        Self {
            text: amount.to_string(),
            amount,
            style,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The amount formatted as currency.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> CellStyle {
        self.style
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    label: String,
    is_total: bool,
    /// One cell per column, in column order.
    cells: Vec<Cell>,
}

impl Row {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_total(&self) -> bool {
        self.is_total
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// A display-ready pivot of spending: one row per category plus a trailing Total row, one column
/// per month plus a Total column. Each cell carries its formatted text and a `CellStyle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
    reverse: bool,
}

impl AggregationTable {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Labels of the month columns in display order, e.g. `["Jan'24", "Feb'24"]`.
    pub fn month_labels(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.is_total())
            .map(Column::label)
            .collect()
    }

    pub fn row(&self, label: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn total_row(&self) -> Option<&Row> {
        self.rows.iter().find(|r| r.is_total)
    }

    /// The month cells of `row`, in display order, without the Total column.
    pub fn month_cells<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a Cell> + 'a {
        self.columns
            .iter()
            .zip(row.cells.iter())
            .filter(|(column, _)| !column.is_total())
            .map(|(_, cell)| cell)
    }

    /// The Total column cell of `row`.
    pub fn total_cell<'a>(&'a self, row: &'a Row) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(Column::is_total)
            .and_then(|ix| row.cells.get(ix))
    }

    /// The month values of the row labeled `label`, in display order.
    pub fn month_values(&self, label: &str) -> Option<Vec<Decimal>> {
        let row = self.row(label)?;
        Some(self.month_cells(row).map(|c| c.amount().value()).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.month_labels().is_empty()
    }
}

/// Builds the monthly table for the `options.lookback_months()` months ending in the month of `now`.
///
/// Transactions dated from the first day of the earliest month through the date of `now`
/// (inclusive) are summed by (month, category). Categories are sorted alphabetically and the Total
/// row is appended last. Month columns are chronological, followed by the Total column; with
/// `reverse` the whole column order is mirrored. A category with no spending in a month shows zero.
pub fn create_main_table<Tz: TimeZone>(
    transactions: &Transactions,
    now: &DateTime<Tz>,
    options: TableOptions,
) -> AggregationTable {
    let today = now.date_naive();
    let start = buckets::months_back(today, options.lookback_months().saturating_sub(1));
    let window = filters::get_dates(transactions, start, today);

    let mut months = BTreeSet::new();
    let mut sums: BTreeMap<&str, BTreeMap<NaiveDate, Amount>> = BTreeMap::new();
    for t in window.iter() {
        let _ = months.insert(t.month());
        *sums
            .entry(t.category())
            .or_default()
            .entry(t.month())
            .or_default() += t.amount();
    }
    let mut months: Vec<NaiveDate> = months.into_iter().collect();

    let mut grid: Vec<(String, bool, Vec<Amount>)> = sums
        .iter()
        .map(|(category, by_month)| {
            let values = months
                .iter()
                .map(|m| by_month.get(m).copied().unwrap_or_default())
                .collect();
            (category.to_string(), false, values)
        })
        .collect();
    let totals = (0..months.len())
        .map(|ix| grid.iter().map(|(_, _, values)| values[ix]).sum())
        .collect();
    grid.push((TOTAL.to_string(), true, totals));

    if options.reverse() {
        months.reverse();
        for (_, _, values) in grid.iter_mut() {
            values.reverse();
        }
    }

    let mut columns: Vec<Column> = months.into_iter().map(Column::month).collect();
    if options.reverse() {
        columns.insert(0, Column::total());
    } else {
        columns.push(Column::total());
    }

    let rows = grid
        .into_iter()
        .map(|(label, is_total, values)| {
            let decimals: Vec<Decimal> = values.iter().map(Amount::value).collect();
            let row_total: Amount = values.iter().sum();
            let mut cells: Vec<Cell> = values
                .into_iter()
                .zip(highlight_row(&decimals))
                .map(|(amount, style)| Cell::new(amount, style))
                .collect();
            let total_cell = Cell::new(row_total, CellStyle::Neutral);
            if options.reverse() {
                cells.insert(0, total_cell);
            } else {
                cells.push(total_cell);
            }
            Row {
                label,
                is_total,
                cells,
            }
        })
        .collect();

    AggregationTable {
        columns,
        rows,
        reverse: options.reverse(),
    }
}
