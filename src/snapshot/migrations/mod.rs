//! Versioned schema for the snapshot file.
//!
//! Each schema version `N` has a pair of scripts next to this file: `migration_NN_up.sql` builds
//! version `N` out of version `N-1` and `migration_NN_down.sql` undoes it. The version a file is at
//! lives in its single-row `schema_version` table; a brand new file is at version 0.

use crate::Result;
use anyhow::{bail, Context};
use sqlx::SqlitePool;
use tracing::debug;

/// The schema version this build reads and writes.
pub(super) const CURRENT_VERSION: i32 = 1;

/// Scripts for version `index + 1`, as (up, down).
const SCRIPTS: &[(&str, &str)] = &[(
    include_str!("migration_01_up.sql"),
    include_str!("migration_01_down.sql"),
)];

/// Returns the schema version of the file, creating the version table at version 0 if needed.
pub(super) async fn schema_version(pool: &SqlitePool) -> Result<i32> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Unable to create the schema_version table")?;
    let (version,): (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Unable to read the schema version")?;
    if let Some(version) = version {
        return Ok(version);
    }
    sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
        .execute(pool)
        .await
        .context("Unable to record the initial schema version")?;
    Ok(0)
}

/// Moves the file to `target`, one version at a time, upgrading or downgrading as needed. A file
/// written by a newer build than this one is refused rather than downgraded.
pub(super) async fn migrate(pool: &SqlitePool, target: i32) -> Result<()> {
    let mut version = schema_version(pool).await?;
    if version > CURRENT_VERSION {
        bail!(
            "The snapshot has schema version {version}, which is newer than this program supports \
            ({CURRENT_VERSION}), delete it and run `spend-dash fetch` again"
        );
    }
    if !(0..=CURRENT_VERSION).contains(&target) {
        bail!("There is no schema version {target}");
    }

    while version != target {
        let (sql, next) = if version < target {
            (script(version + 1)?.0, version + 1)
        } else {
            (script(version)?.1, version - 1)
        };
        debug!("Migrating the snapshot schema from version {version} to {next}");
        apply(pool, sql, next).await?;
        version = next;
    }
    Ok(())
}

fn script(version: i32) -> Result<(&'static str, &'static str)> {
    usize::try_from(version - 1)
        .ok()
        .and_then(|ix| SCRIPTS.get(ix))
        .copied()
        .with_context(|| format!("No migration scripts for schema version {version}"))
}

/// Runs `script` and records `version` in one transaction.
async fn apply(pool: &SqlitePool, script: &str, version: i32) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Unable to start the migration")?;
    sqlx::raw_sql(script)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("The migration to schema version {version} failed"))?;
    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(version)
        .execute(&mut *tx)
        .await
        .context("Unable to record the schema version")?;
    tx.commit().await.context("Unable to commit the migration")
}
