//! Access to the worksheet that holds the transactions.
//!
//! `Sheet` is the seam between the app and its data source. There are three implementations:
//! - `GoogleSheet` reads a Google sheet through the Sheets API.
//! - `CsvSheet` reads a directory of CSV exports, one `<worksheet>.csv` per worksheet.
//! - `TestSheet` holds seeded data in memory so the whole app can run without any of the above.

mod csv_sheet;
mod files;
mod google;
mod oauth;
mod test_sheet;

use crate::config::DataSource;
use crate::model::Transactions;
use crate::{Config, Result};
use std::io::Cursor;
use tracing::{debug, info};

pub use csv_sheet::CsvSheet;
pub use test_sheet::TestSheet;

pub(crate) use google::GoogleSheet;
pub(crate) use oauth::TokenProvider;

/// The worksheet read when none is configured.
pub const DEFAULT_WORKSHEET: &str = "Combined";

/// The columns kept when none are configured: every column of the default layout except the
/// description.
pub const DEFAULT_COLUMNS: &[usize] = &[0, 2, 3, 4, 5, 6, 7, 8, 9];

/// When this environment variable is set to a non-empty value, `TestSheet` is used instead of the
/// configured data source.
pub const TEST_MODE_ENV: &str = "SPEND_DASH_IN_TEST_MODE";

/// Read-only access to a spreadsheet's worksheets.
#[async_trait::async_trait]
pub trait Sheet {
    /// Returns every row of `sheet_name`, including the header row, as formatted strings. Trailing
    /// empty cells may be missing from a row.
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>>;
}

/// Selects the real data source or the in-memory `TestSheet`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Live,
    Test,
}

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// Creates the `Sheet` for `config` in the given `mode`.
pub async fn sheet(config: &Config, mode: Mode) -> Result<Box<dyn Sheet + Send>> {
    if mode == Mode::Test {
        info!("Test mode: using the in-memory test sheet");
        return Ok(Box::new(TestSheet::default()));
    }
    match config.source() {
        DataSource::Google { .. } => {
            let token_provider =
                TokenProvider::load(&config.client_secret_path(), &config.token_path()).await?;
            Ok(Box::new(GoogleSheet::new(
                config.spreadsheet_id()?,
                token_provider,
            )))
        }
        DataSource::Csv { dir } => Ok(Box::new(CsvSheet::new(config.resolve(dir)))),
    }
}

/// Reads `worksheet` and parses it, keeping only `columns` when given.
pub async fn fetch_transactions(
    sheet: &mut (dyn Sheet + Send),
    worksheet: &str,
    columns: Option<&[usize]>,
) -> Result<Transactions> {
    let values = sheet.get(worksheet).await?;
    debug!("Fetched {} rows from '{worksheet}'", values.len());
    Transactions::parse(values, columns)
}

/// Loads rows from CSV text. Every record is returned, including the first, and records may have
/// different lengths.
pub(crate) fn load_csv(csv_data: &str) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Read-only access to spreadsheets.
const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets.readonly"];
