use crate::api::{self, Mode};
use crate::commands::Out;
use crate::snapshot::Snapshot;
use crate::{Config, Result};

/// Handles `spend-dash fetch`: reads the configured worksheet and replaces the local snapshot with
/// it.
pub async fn fetch(config: &Config, mode: Mode) -> Result<Out<usize>> {
    let mut sheet = api::sheet(config, mode).await?;
    let transactions =
        api::fetch_transactions(sheet.as_mut(), config.worksheet(), config.columns()).await?;
    let path = config.snapshot_path();
    Snapshot::save(&path, &transactions).await?;
    Ok(Out::new(
        format!(
            "Saved {} transactions from '{}' to {}",
            transactions.len(),
            config.worksheet(),
            path.display()
        ),
        transactions.len(),
    ))
}
