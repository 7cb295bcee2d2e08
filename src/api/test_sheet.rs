//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a real spreadsheet. See `TEST_MODE_ENV`.

use crate::api::{Sheet, DEFAULT_WORKSHEET};
use crate::Result;
use anyhow::Context;
use std::collections::HashMap;

/// An implementation of the `Sheet` trait that holds its worksheets in memory. By default, it is
/// seeded with four months of spending in the `Combined` worksheet.
#[derive(Debug, Clone)]
pub struct TestSheet {
    data: HashMap<String, Vec<Vec<String>>>,
}

impl TestSheet {
    /// The map key is the worksheet name and the map value is the rows of the worksheet.
    pub fn new(data: HashMap<String, Vec<Vec<String>>>) -> Self {
        Self { data }
    }

    /// Adds or replaces a worksheet.
    pub fn with_worksheet<S, R>(mut self, name: &str, rows: impl IntoIterator<Item = R>) -> Self
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let _ = self.data.insert(name.to_string(), rows);
        self
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        self.data
            .get(sheet_name)
            .with_context(|| format!("Worksheet '{sheet_name}' not found"))
            .cloned()
    }
}

impl Default for TestSheet {
    fn default() -> Self {
        Self::new(HashMap::new()).with_worksheet(DEFAULT_WORKSHEET, SEED_DATA.iter().copied())
    }
}

/// Seed data for the `Combined` worksheet. It includes a refund, a row without a date and a row
/// without a type.
#[rustfmt::skip]
const SEED_DATA: &[[&str; 10]] = &[
    ["Date", "Description", "Type", "Amount", "Account", "Institution", "Month", "Week", "Note", "Labels"],
    ["7/3/2025", "Safeway #1534", "Groceries", "$70.00", "Credit Card 1", "Bank A", "7/1/25", "6/30/25", "", ""],
    ["7/8/2025", "City Power", "Utilities", "$90.00", "Checking 1", "Bank A", "7/1/25", "7/7/25", "", "bills"],
    ["7/12/2025", "Taqueria El Sol", "Dining", "$40.27", "Credit Card 1", "Bank A", "7/1/25", "7/7/25", "", ""],
    ["7/19/2025", "Trader Joe's #429", "Groceries", "$50.00", "Credit Card 1", "Bank A", "7/1/25", "7/14/25", "", ""],
    ["7/22/2025", "Metro Card Reload", "Transport", "$21.50", "Credit Card 1", "Bank A", "7/1/25", "7/21/25", "", ""],
    ["8/2/2025", "Safeway #1534", "Groceries", "$100.58", "Credit Card 1", "Bank A", "8/1/25", "7/28/25", "", ""],
    ["8/8/2025", "City Power", "Utilities", "$105.00", "Checking 1", "Bank A", "8/1/25", "8/4/25", "heat wave", "bills"],
    ["8/15/2025", "Noodle Bar", "Dining", "$31.00", "Credit Card 1", "Bank A", "8/1/25", "8/11/25", "", ""],
    ["9/4/2025", "Costco Wholesale", "Groceries", "$122.96", "Credit Card 1", "Bank A", "9/1/25", "9/1/25", "", ""],
    ["9/8/2025", "City Power", "Utilities", "$100.00", "Checking 1", "Bank A", "9/1/25", "9/8/25", "", "bills"],
    ["9/13/2025", "Pizza Place", "Dining", "$25.00", "Credit Card 1", "Bank A", "9/1/25", "9/8/25", "", ""],
    ["9/20/2025", "Shell Gas Station", "Transport", "$40.00", "Credit Card 1", "Bank A", "9/1/25", "9/15/25", "", ""],
    ["10/2/2025", "Safeway #1534", "Groceries", "$95.82", "Credit Card 1", "Bank A", "10/1/25", "9/29/25", "", ""],
    ["10/6/2025", "City Power", "Utilities", "$60.00", "Checking 1", "Bank A", "10/1/25", "10/6/25", "", "bills"],
    ["10/8/2025", "City Water District", "Utilities", "$38.10", "Checking 1", "Bank A", "10/1/25", "10/6/25", "", "bills"],
    ["10/9/2025", "Shell Gas Station", "Transport", "$55.20", "Credit Card 1", "Bank A", "10/1/25", "10/6/25", "", ""],
    ["10/14/2025", "Corner Cafe", "Dining", "$12.40", "Credit Card 1", "Bank A", "10/1/25", "10/13/25", "", ""],
    ["10/16/2025", "Corner Cafe", "Dining", "-$2.40", "Credit Card 1", "Bank A", "10/1/25", "10/13/25", "refund", ""],
    ["", "Pending Charge", "Groceries", "$9.99", "Credit Card 1", "Bank A", "", "", "", ""],
    ["10/18/2025", "Transfer to Savings", "", "$500.00", "Checking 1", "Bank A", "10/1/25", "10/13/25", "", ""],
    ["10/25/2025", "Trader Joe's #429", "Groceries", "$40.00", "Credit Card 1", "Bank A", "10/1/25", "10/20/25", "", ""],
];
