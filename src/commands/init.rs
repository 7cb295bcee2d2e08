use crate::args::InitArgs;
use crate::commands::Out;
use crate::config::DataSource;
use crate::{Config, Result};
use anyhow::{bail, Context};
use std::path::Path;

/// Creates the home directory, its secrets directory and an initial `config.json` for the source
/// named in `args`. OAuth client credentials, when given, are copied into the secrets directory.
///
/// # Errors
/// - Returns an error if neither or both of a sheet URL and a CSV directory are given, or if any
///   file operation fails.
pub async fn init(home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let source = match (args.sheet_url(), args.csv_dir()) {
        (Some(sheet_url), None) => DataSource::Google {
            sheet_url: sheet_url.to_string(),
        },
        (None, Some(dir)) => DataSource::Csv {
            dir: dir.to_path_buf(),
        },
        _ => bail!("Pass exactly one of --sheet-url or --csv-dir"),
    };
    let is_google = matches!(source, DataSource::Google { .. });
    let config = Config::create(home, source, args.client_secret(), args.timezone())
        .await
        .context("Unable to create the home directory and config")?;

    let next = if is_google {
        "run `spend-dash auth` next"
    } else {
        "run `spend-dash table` to see your spending"
    };
    Ok(format!(
        "Created the spend-dash home directory at {}, {next}",
        config.root().display()
    )
    .into())
}
