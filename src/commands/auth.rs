//! Authentication command handlers for the OAuth flow.
//!
//! - `spend-dash auth` - Initial OAuth consent flow
//! - `spend-dash auth --verify` - Verify and refresh authentication

use crate::api::TokenProvider;
use crate::commands::Out;
use crate::config::DataSource;
use crate::{Config, Result};
use anyhow::{bail, Context};

/// Handles `spend-dash auth`: runs the consent flow in the browser and saves the tokens.
///
/// This is the only command that opens a browser.
pub async fn auth(config: &Config) -> Result<Out<()>> {
    require_google(config)?;
    let token_path = config.token_path();
    let _ = TokenProvider::initialize(&config.client_secret_path(), &token_path).await?;
    Ok(format!("Saved the OAuth token to {}", token_path.display()).into())
}

/// Handles `spend-dash auth --verify`: loads the saved tokens and refreshes them.
///
/// This never opens a browser. If the token is missing, invalid, or has the wrong scopes, it fails
/// with a message telling the user to run `spend-dash auth`.
pub async fn auth_verify(config: &Config) -> Result<Out<()>> {
    require_google(config)?;
    let mut token_provider =
        TokenProvider::load(&config.client_secret_path(), &config.token_path())
            .await
            .context(
                "Unable to use the existing tokens found in the token JSON file. \n\n\
                You should run 'spend-dash auth' (without the --verify flag).",
            )?;
    token_provider
        .refresh()
        .await
        .context("Unable to refresh the token")?;
    Ok("Your OAuth token is valid!".into())
}

fn require_google(config: &Config) -> Result<()> {
    if let DataSource::Csv { .. } = config.source() {
        bail!("The configured data source is a CSV directory, it does not need authentication");
    }
    Ok(())
}
