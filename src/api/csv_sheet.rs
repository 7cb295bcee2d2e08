//! Implements the `Sheet` trait over a directory of CSV files, for spreadsheets that are exported
//! instead of read through the Google API.

use crate::api::{load_csv, Sheet};
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Each worksheet is a file named `<worksheet>.csv` in `dir`.
#[derive(Debug, Clone)]
pub struct CsvSheet {
    dir: PathBuf,
}

impl CsvSheet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, sheet_name: &str) -> PathBuf {
        self.dir.join(format!("{sheet_name}.csv"))
    }
}

#[async_trait::async_trait]
impl Sheet for CsvSheet {
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        let path = self.path(sheet_name);
        trace!("get for {sheet_name} from {}", path.display());
        let content = utils::read(&path)
            .await
            .with_context(|| format!("Worksheet '{sheet_name}' not found"))?;
        load_csv(&content).with_context(|| format!("Unable to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_csv_sheet_get() {
        let dir = TempDir::new().unwrap();
        utils::write(
            dir.path().join("Combined.csv"),
            "Date,Type,Amount\n2024-01-05,Food,\"$1,010.00\"\n",
        )
        .await
        .unwrap();

        let mut sheet = CsvSheet::new(dir.path());
        let rows = sheet.get("Combined").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][2], "$1,010.00");

        let err = sheet.get("Other").await.unwrap_err();
        assert!(format!("{err:#}").contains("Worksheet 'Other' not found"));
    }
}
