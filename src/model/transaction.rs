use crate::buckets;
use crate::model::mapping::{select_columns, validate_columns, Header, Mapping};
use crate::model::Amount;
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

pub const DATE_STR: &str = "Date";
pub const TYPE_STR: &str = "Type";
pub const AMOUNT_STR: &str = "Amount";

/// Date formats accepted in the `Date` column, tried in order. `%Y` accepts a year of any width, so
/// the two-digit form must come before it or `1/5/24` would land in the year 24.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// The transaction rows of a worksheet along with its header mapping.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transactions {
    mapping: Mapping,
    data: Vec<Transaction>,
}

impl Transactions {
    /// Parses worksheet values. The first row is the header row. When `columns` is given, only the
    /// cells at those (zero-based) positions are kept, in that order, before anything else happens.
    ///
    /// Rows with a blank `Date` or a blank `Type` are skipped since they cannot be bucketed or
    /// grouped. Any other malformed cell is an error.
    pub fn parse<S, R>(
        sheet_data: impl IntoIterator<Item = R>,
        columns: Option<&[usize]>,
    ) -> Result<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let mut rows = sheet_data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<String>>());

        let header_row = match rows.next() {
            Some(header_row) => header_row,
            None => bail!("An empty data set cannot be parsed into a Transactions object"),
        };
        if let Some(columns) = columns {
            validate_columns(columns, header_row.len())?;
        }
        let mapping = Mapping::new(select_columns(header_row, columns))?;
        let layout = Layout::new(&mapping)?;

        let mut data = Vec::new();
        let mut skipped = 0usize;
        for (row_ix, row) in rows.enumerate() {
            // Spreadsheet row numbers are 1-based and the header occupies row 1.
            let sheet_row = row_ix + 2;
            let values = select_columns(row, columns);
            if values.len() > mapping.len() {
                bail!("A row longer than the headers list was encountered at row {sheet_row}");
            }
            match Transaction::from_row(&mapping, &layout, values)
                .with_context(|| format!("Unable to parse row {sheet_row}"))?
            {
                Some(transaction) => data.push(transaction),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!("Skipped {skipped} rows with a blank {DATE_STR} or {TYPE_STR}");
        }

        Ok(Self { mapping, data })
    }

    pub(crate) fn from_parts(mapping: Mapping, data: Vec<Transaction>) -> Self {
        Self { mapping, data }
    }

    /// A new collection with the same headers as `self` holding `data`.
    pub fn with_data(&self, data: Vec<Transaction>) -> Self {
        Self {
            mapping: self.mapping.clone(),
            data,
        }
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn headers(&self) -> &[Header] {
        self.mapping.headers()
    }

    pub fn data(&self) -> &[Transaction] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Positions of the three columns that every transaction needs.
struct Layout {
    date: usize,
    category: usize,
    amount: usize,
}

impl Layout {
    fn new(mapping: &Mapping) -> Result<Self> {
        Ok(Self {
            date: mapping.require(DATE_STR)?,
            category: mapping.require(TYPE_STR)?,
            amount: mapping.require(AMOUNT_STR)?,
        })
    }
}

/// A single spending row: when it happened, what kind of spending it was and how much.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    date: NaiveDate,
    #[serde(rename = "type")]
    category: String,
    amount: Amount,
    /// Every other column of the row, keyed by header.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    other_fields: BTreeMap<String, String>,
}

impl Transaction {
    pub fn new(date: NaiveDate, category: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            category: category.into(),
            amount,
            other_fields: BTreeMap::new(),
        }
    }

    /// Adds a value for a column other than `Date`, `Type` or `Amount`.
    pub fn with_field(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.other_fields.insert(header.into(), value.into());
        self
    }

    pub(crate) fn with_fields(mut self, other_fields: BTreeMap<String, String>) -> Self {
        self.other_fields = other_fields;
        self
    }

    fn from_row(
        mapping: &Mapping,
        layout: &Layout,
        mut values: Vec<String>,
    ) -> Result<Option<Self>> {
        values.resize(mapping.len(), String::new());
        let date = values[layout.date].trim();
        let category = values[layout.category].trim();
        if date.is_empty() || category.is_empty() {
            return Ok(None);
        }

        let mut transaction = Transaction::new(
            parse_date(date)?,
            category,
            Amount::from_str(&values[layout.amount])?,
        );
        for (ix, (header, value)) in mapping.headers().iter().zip(values).enumerate() {
            if ix != layout.date && ix != layout.category && ix != layout.amount {
                let _ = transaction
                    .other_fields
                    .insert(header.as_ref().to_string(), value);
            }
        }
        Ok(Some(transaction))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The category label, found in the `Type` column.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn other_fields(&self) -> &BTreeMap<String, String> {
        &self.other_fields
    }

    /// The month bucket: the first day of the month containing `date`.
    pub fn month(&self) -> NaiveDate {
        buckets::month_start(self.date)
    }

    /// The week bucket: the Monday of the week containing `date`.
    pub fn week_start(&self) -> NaiveDate {
        buckets::week_start(self.date)
    }

    /// The value of a column by header, formatted as it would appear in the sheet.
    pub fn field(&self, header: &str) -> Option<String> {
        match header {
            DATE_STR => Some(self.date.format("%Y-%m-%d").to_string()),
            TYPE_STR => Some(self.category.clone()),
            AMOUNT_STR => Some(self.amount.to_string()),
            other => self.other_fields.get(other).cloned(),
        }
    }
}

/// Parses a sheet date. A trailing time of day, as in `2024-01-05 00:00:00`, is ignored.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let date_part = s.split_whitespace().next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .with_context(|| format!("Unable to parse '{s}' as a date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-05").unwrap(), d(2024, 1, 5));
        assert_eq!(parse_date("1/5/2024").unwrap(), d(2024, 1, 5));
        assert_eq!(parse_date("01/05/24").unwrap(), d(2024, 1, 5));
        assert_eq!(parse_date("7/1/25").unwrap(), d(2025, 7, 1));
        assert_eq!(parse_date("12/31/1999").unwrap(), d(1999, 12, 31));
        assert_eq!(parse_date("2024-01-05 00:00:00").unwrap(), d(2024, 1, 5));
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_transactions() {
        let transactions = Transactions::parse(
            vec![
                vec!["Date", "Type", "Amount", "Note"],
                vec!["2024-01-05", "Food", "$10.00", "lunch"],
                vec!["1/20/2024", "Food", "5"],
                vec!["", "Food", "$99.00", "no date"],
                vec!["2024-02-02", "", "$99.00", "no type"],
            ],
            None,
        )
        .unwrap();

        assert_eq!(transactions.len(), 2);
        let first = &transactions.data()[0];
        assert_eq!(first.date(), d(2024, 1, 5));
        assert_eq!(first.category(), "Food");
        assert_eq!(first.amount().to_string(), "$10.00");
        assert_eq!(first.field("Note").as_deref(), Some("lunch"));
        assert_eq!(first.month(), d(2024, 1, 1));
        assert_eq!(first.week_start(), d(2024, 1, 1));

        // The short row is padded with blanks.
        let second = &transactions.data()[1];
        assert_eq!(second.field("Note").as_deref(), Some(""));
        assert_eq!(second.week_start(), d(2024, 1, 15));
    }

    #[test]
    fn test_parse_with_column_selection() {
        let transactions = Transactions::parse(
            vec![
                vec!["Date", "Description", "Type", "Amount"],
                vec!["2024-01-05", "Cafe", "Food", "$10.00"],
            ],
            Some(&[0, 2, 3][..]),
        )
        .unwrap();
        let headers: Vec<&str> = transactions.headers().iter().map(|h| h.as_ref()).collect();
        assert_eq!(headers, vec!["Date", "Type", "Amount"]);
        assert!(transactions.data()[0].other_fields().is_empty());
    }

    #[test]
    fn test_parse_column_selection_out_of_range() {
        let result =
            Transactions::parse(vec![vec!["Date", "Type", "Amount"]], Some(&[0, 7][..]));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_missing_required_column() {
        let result = Transactions::parse(vec![vec!["Date", "Amount"]], None);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("'Type'"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(Transactions::parse(Vec::<Vec<&str>>::new(), None).is_err());
    }

    #[test]
    fn test_parse_row_too_long() {
        let result = Transactions::parse(
            vec![
                vec!["Date", "Type", "Amount"],
                vec!["2024-01-05", "Food", "1", "extra"],
            ],
            None,
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("row 2"));
    }

    #[test]
    fn test_parse_bad_amount_names_row() {
        let result = Transactions::parse(
            vec![
                vec!["Date", "Type", "Amount"],
                vec!["2024-01-05", "Food", "1"],
                vec!["2024-01-06", "Food", "lots"],
            ],
            None,
        );
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("row 3"));
    }
}
