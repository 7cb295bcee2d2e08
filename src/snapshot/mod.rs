//! The local SQLite copy of the last fetched transactions.
//!
//! `fetch` writes it and every report command can read it with `--offline`. Each save replaces the
//! whole content; there is no history.

mod migrations;

use crate::model::{parse_date, Amount, Mapping, Transaction, Transactions};
use crate::Result;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// An open snapshot file.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
    pool: SqlitePool,
}

impl Snapshot {
    /// Opens the snapshot at `path`, creating the file if needed, and brings its schema up to date.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open the snapshot at {}", path.display()))?;
        migrations::migrate(&pool, migrations::CURRENT_VERSION)
            .await
            .with_context(|| format!("Unable to migrate the snapshot at {}", path.display()))?;
        Ok(Self { path, pool })
    }

    /// Replaces the content of the snapshot file at `path` with `transactions`.
    pub async fn save(path: impl Into<PathBuf>, transactions: &Transactions) -> Result<()> {
        Self::open(path).await?.write(transactions).await
    }

    /// Reads back the transactions last saved to `path`, in their original order.
    pub async fn load(path: impl AsRef<Path>) -> Result<Transactions> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!(
                "There is no snapshot at {}, run `spend-dash fetch` first",
                path.display()
            );
        }
        Self::open(path).await?.read().await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces every stored header and row in a single transaction.
    pub async fn write(&self, transactions: &Transactions) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin snapshot transaction")?;

        sqlx::query("DELETE FROM transactions")
            .execute(&mut *tx)
            .await
            .context("Failed to clear snapshot transactions")?;
        sqlx::query("DELETE FROM headers")
            .execute(&mut *tx)
            .await
            .context("Failed to clear snapshot headers")?;

        for (position, header) in transactions.headers().iter().enumerate() {
            sqlx::query("INSERT INTO headers (position, name) VALUES (?, ?)")
                .bind(position as i64)
                .bind(header.as_ref())
                .execute(&mut *tx)
                .await
                .context("Failed to insert snapshot header")?;
        }

        for (row_ix, t) in transactions.iter().enumerate() {
            let other_fields = serde_json::to_string(t.other_fields())
                .context("Unable to serialize the other fields of a transaction")?;
            sqlx::query(
                "INSERT INTO transactions (row_ix, date, category, amount, other_fields) \
                VALUES (?, ?, ?, ?, ?)",
            )
            .bind(row_ix as i64)
            .bind(t.date().format("%Y-%m-%d").to_string())
            .bind(t.category())
            .bind(t.amount().value().to_string())
            .bind(other_fields)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert snapshot row {row_ix}"))?;
        }

        tx.commit()
            .await
            .context("Failed to commit snapshot transaction")?;
        debug!(
            "Saved {} transactions to {}",
            transactions.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Reads every stored header and row.
    pub async fn read(&self) -> Result<Transactions> {
        let headers: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM headers ORDER BY position")
                .fetch_all(&self.pool)
                .await
                .context("Failed to read snapshot headers")?;
        let mapping = Mapping::new(headers.into_iter().map(|(name,)| name))?;

        let rows: Vec<(i64, String, String, String, String)> = sqlx::query_as(
            "SELECT row_ix, date, category, amount, other_fields FROM transactions ORDER BY row_ix",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to read snapshot transactions")?;

        let mut data = Vec::with_capacity(rows.len());
        for (row_ix, date, category, amount, other_fields) in rows {
            let other_fields: BTreeMap<String, String> = serde_json::from_str(&other_fields)
                .with_context(|| format!("Corrupt other_fields in snapshot row {row_ix}"))?;
            let transaction = Transaction::new(
                parse_date(&date)?,
                category,
                Amount::from_str(&amount)
                    .with_context(|| format!("Corrupt amount in snapshot row {row_ix}"))?,
            )
            .with_fields(other_fields);
            data.push(transaction);
        }
        debug!("Read {} transactions from {}", data.len(), self.path.display());
        Ok(Transactions::from_parts(mapping, data))
    }

    pub async fn count(&self) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count snapshot transactions")?;
        Ok(u64::try_from(row.0).unwrap_or_default())
    }
}
