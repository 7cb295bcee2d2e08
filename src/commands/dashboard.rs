//! The dashboard page and the interactive loop that keeps it up to date.

use crate::api::Mode;
use crate::args::DashboardArgs;
use crate::commands::{local_now, table_options, Out};
use crate::loader::Loader;
use crate::report::{self, TableOptions};
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

const DASHBOARD_HTML: &str = "dashboard.html";

/// A line of input to the interactive dashboard.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DashboardCommand {
    /// An empty line: render again, from the cache while it is fresh.
    Render,
    /// `r`: bump the refresh counter, which refetches the data, then render.
    Refresh,
    /// `q`: stop.
    Quit,
}

impl DashboardCommand {
    /// Returns `None` for a line that is not a command.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "" => Some(Self::Render),
            "r" | "refresh" => Some(Self::Refresh),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Handles `spend-dash dashboard`: writes the HTML page, then with `--interactive` reads commands
/// from `input` until `q` or the end of input. `clock` is read once per render.
pub async fn dashboard<C, R>(
    config: &Config,
    mode: Mode,
    args: &DashboardArgs,
    clock: C,
    input: R,
) -> Result<Out<u64>>
where
    C: Fn() -> DateTime<Utc>,
    R: AsyncBufRead + Unpin,
{
    let out_path = args
        .out()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.root().join(DASHBOARD_HTML));
    let options = table_options(config, args.layout());
    let mut loader = Loader::from_config(config, mode, args.source().offline()).await?;
    let mut renders = 0u64;

    render(config, &mut loader, options, &out_path, clock()).await?;
    renders += 1;

    if args.interactive() {
        info!("Press Enter to re-render, r to refetch the data, q to quit");
        let mut lines = input.lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("Unable to read from stdin")?
        {
            match DashboardCommand::parse(&line) {
                Some(DashboardCommand::Quit) => break,
                Some(DashboardCommand::Refresh) => {
                    let _ = loader.refresh();
                }
                Some(DashboardCommand::Render) => {}
                None => {
                    warn!("Unknown command '{}', expected Enter, r or q", line.trim());
                    continue;
                }
            }
            // A failed render is reported and the loop keeps going.
            match render(config, &mut loader, options, &out_path, clock()).await {
                Ok(()) => renders += 1,
                Err(e) => warn!("Unable to render the dashboard: {e:#}"),
            }
        }
    }

    Ok(Out::new(
        format!("Wrote the dashboard to {}", out_path.display()),
        renders,
    ))
}

async fn render(
    config: &Config,
    loader: &mut Loader,
    options: TableOptions,
    out_path: &Path,
    now: DateTime<Utc>,
) -> Result<()> {
    let transactions = loader.load(now).await?;
    let local = local_now(config, now)?;
    let table = report::create_main_table(&transactions, &local, options);
    let chart = report::create_pie_chart(&transactions, &local);
    let generated_at = local.format("%Y-%m-%d %H:%M %Z").to_string();
    let page = report::render_dashboard(&table, &chart, &generated_at);
    utils::write(out_path, page).await?;
    info!("Rendered the dashboard to {}", out_path.display());
    Ok(())
}
