use chrono::Utc;
use clap::Parser;
use spend_dash::args::{Args, Command};
use spend_dash::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // When SPEND_DASH_IN_TEST_MODE is set and non-empty, the in-memory test sheet stands in for the
    // configured data source.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.print(),

        Command::Auth(auth_args) => {
            let config = Config::load(home).await?;
            if auth_args.verify() {
                commands::auth_verify(&config).await?.print()
            } else {
                commands::auth(&config).await?.print()
            }
        }

        Command::Fetch => {
            let config = Config::load(home).await?;
            commands::fetch(&config, mode).await?.print()
        }

        Command::Table(table_args) => {
            let config = Config::load(home).await?;
            commands::table(&config, mode, table_args, Utc::now())
                .await?
                .print()
        }

        Command::Pie(pie_args) => {
            let config = Config::load(home).await?;
            commands::pie(&config, mode, pie_args, Utc::now())
                .await?
                .print()
        }

        Command::Slice(slice_args) => {
            let config = Config::load(home).await?;
            commands::slice(&config, mode, slice_args, Utc::now())
                .await?
                .print()
        }

        Command::Dashboard(dashboard_args) => {
            let config = Config::load(home).await?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            commands::dashboard(&config, mode, dashboard_args, Utc::now, stdin)
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber. Logs go to stderr so that reports on stdout can be piped.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // The library and the binary share the crate name.
        None => EnvFilter::new(format!("{}={level}", env!("CARGO_CRATE_NAME"))),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
