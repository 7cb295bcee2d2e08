//! Command handlers for the spend-dash CLI.
//!
//! This module contains implementations for all CLI subcommands. Every handler takes "now" as an
//! argument; only `main` reads the clock.

mod auth;
mod dashboard;
mod fetch;
mod init;
mod report;

use crate::args::LayoutArgs;
use crate::report::TableOptions;
use crate::{Config, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use auth::{auth, auth_verify};
pub use dashboard::{dashboard, DashboardCommand};
pub use fetch::fetch;
pub use init::init;
pub use report::{pie, slice, table};

/// The output type for a command. It carries a message for the log, optionally a rendered report
/// for stdout, and optionally the structured data the report was rendered from.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Text meant for stdout, e.g. a rendered table.
    report: Option<String>,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            report: None,
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            report: None,
            structure: None,
        }
    }

    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.report = Some(report.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the report to stdout, the message to `info!` and the structured data (if it exists)
    /// as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(report) = self.report() {
            println!("{report}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// `now` as seen from the configured timezone.
fn local_now(config: &Config, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
    Ok(now.with_timezone(&config.timezone()?))
}

/// The configured table layout with command line overrides applied.
fn table_options(config: &Config, layout: &LayoutArgs) -> TableOptions {
    let configured = config.table_options();
    TableOptions::new(
        layout.months().unwrap_or(configured.lookback_months()),
        layout.reverse().unwrap_or(configured.reverse()),
    )
}
