//! These structs provide the CLI interface for the spend-dash CLI.

use crate::buckets;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// spend-dash: a small personal-finance dashboard.
///
/// The purpose of this program is to read your transactions from a spreadsheet worksheet (a Google
/// sheet or a directory of CSV exports), sum your spending by month and by type, and show the
/// result as a table and a donut chart, either in the terminal or as an HTML page.
///
/// Reading a Google sheet needs OAuth client credentials from the Google Cloud console, see
/// `spend-dash init --help`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and its configuration file.
    ///
    /// This is the first command you should run. Pass either --sheet-url, to read a Google sheet,
    /// or --csv-dir, to read a directory of CSV exports named `<worksheet>.csv`.
    ///
    /// For a Google sheet you also need OAuth 2.0 client credentials of the "Desktop app" kind,
    /// downloaded from the Google Cloud console and passed as --client-secret. They are copied
    /// into the home directory. Then run `spend-dash auth`.
    Init(InitArgs),
    /// Authenticate with Google Sheets via OAuth.
    Auth(AuthArgs),
    /// Download the worksheet and save it to the local snapshot for use with --offline.
    Fetch,
    /// Print spending by type for the last few months.
    Table(TableArgs),
    /// Print this month's spending by type as a chart.
    Pie(PieArgs),
    /// Print the transactions of a date range, a month or a week.
    Slice(SliceArgs),
    /// Write the dashboard HTML page and, with --interactive, keep re-rendering it.
    Dashboard(DashboardArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration, secrets and the snapshot are held. Defaults to
    /// ~/spend-dash
    #[arg(long, env = "SPEND_DASH_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `spend-dash init` command.
#[derive(Debug, Parser, Clone)]
#[command(group(ArgGroup::new("source").required(true).args(["sheet_url", "csv_dir"])))]
pub struct InitArgs {
    /// The URL of your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: Option<String>,

    /// A directory of CSV exports, one `<worksheet>.csv` per worksheet.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// The path to your downloaded OAuth client credentials. Required with --sheet-url.
    #[arg(long, requires = "sheet_url")]
    client_secret: Option<PathBuf>,

    /// The IANA timezone that decides what "today" is, e.g. America/Los_Angeles. Defaults to UTC.
    #[arg(long)]
    timezone: Option<String>,
}

impl InitArgs {
    pub fn new(
        sheet_url: Option<String>,
        csv_dir: Option<PathBuf>,
        client_secret: Option<PathBuf>,
        timezone: Option<String>,
    ) -> Self {
        Self {
            sheet_url,
            csv_dir,
            client_secret,
            timezone,
        }
    }

    pub fn sheet_url(&self) -> Option<&str> {
        self.sheet_url.as_deref()
    }

    pub fn csv_dir(&self) -> Option<&Path> {
        self.csv_dir.as_deref()
    }

    pub fn client_secret(&self) -> Option<&Path> {
        self.client_secret.as_deref()
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }
}

/// (Not shown): Args for the `spend-dash auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// Verify and refresh authentication.
    #[arg(long)]
    verify: bool,
}

impl AuthArgs {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }

    pub fn verify(&self) -> bool {
        self.verify
    }
}

/// (Not shown): Args for every command that reads transactions.
#[derive(Debug, Default, Parser, Clone)]
pub struct SourceArgs {
    /// Read the local snapshot written by `spend-dash fetch` instead of the data source.
    #[arg(long, global = true)]
    offline: bool,
}

impl SourceArgs {
    pub fn new(offline: bool) -> Self {
        Self { offline }
    }

    pub fn offline(&self) -> bool {
        self.offline
    }
}

/// (Not shown): Layout overrides for the month table.
#[derive(Debug, Default, Parser, Clone)]
pub struct LayoutArgs {
    /// How many months to show, counting the current one. Defaults to the configured value.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    months: Option<u32>,

    /// Show the newest month first.
    #[arg(long, overrides_with = "no_reverse")]
    reverse: bool,

    /// Show the oldest month first, even when the config file says otherwise.
    #[arg(long, overrides_with = "reverse")]
    no_reverse: bool,
}

impl LayoutArgs {
    pub fn new(months: Option<u32>, reverse: Option<bool>) -> Self {
        Self {
            months,
            reverse: reverse == Some(true),
            no_reverse: reverse == Some(false),
        }
    }

    pub fn months(&self) -> Option<u32> {
        self.months
    }

    /// The ordering asked for on the command line, if any.
    pub fn reverse(&self) -> Option<bool> {
        match (self.reverse, self.no_reverse) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// (Not shown): Args for the `spend-dash table` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct TableArgs {
    #[clap(flatten)]
    layout: LayoutArgs,

    #[clap(flatten)]
    source: SourceArgs,
}

impl TableArgs {
    pub fn new(layout: LayoutArgs, source: SourceArgs) -> Self {
        Self { layout, source }
    }

    pub fn layout(&self) -> &LayoutArgs {
        &self.layout
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }
}

/// (Not shown): Args for the `spend-dash pie` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct PieArgs {
    #[clap(flatten)]
    source: SourceArgs,
}

impl PieArgs {
    pub fn new(source: SourceArgs) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }
}

/// (Not shown): Args for the `spend-dash slice` command.
#[derive(Debug, Parser, Clone)]
pub struct SliceArgs {
    #[command(subcommand)]
    range: SliceRange,

    #[clap(flatten)]
    source: SourceArgs,
}

impl SliceArgs {
    pub fn new(range: SliceRange, source: SourceArgs) -> Self {
        Self { range, source }
    }

    pub fn range(&self) -> &SliceRange {
        &self.range
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SliceRange {
    /// Transactions dated from START to END, both included. Dates are YYYY-MM-DD.
    Dates { start: NaiveDate, end: NaiveDate },
    /// Transactions of one month, given as YYYY-MM.
    Month {
        #[arg(value_parser = parse_month)]
        month: NaiveDate,
    },
    /// Transactions of the week starting on WEEK, which must be a Monday given as YYYY-MM-DD.
    Week { week: String },
}

fn parse_month(s: &str) -> std::result::Result<NaiveDate, String> {
    buckets::parse_month(s).map_err(|e| format!("{e:#}"))
}

/// (Not shown): Args for the `spend-dash dashboard` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct DashboardArgs {
    /// Where to write the HTML page. Defaults to $SPEND_DASH_HOME/dashboard.html
    #[arg(long)]
    out: Option<PathBuf>,

    /// Keep running and re-render on every line read from stdin: an empty line re-renders, `r`
    /// refetches the data and `q` quits.
    #[arg(long)]
    interactive: bool,

    #[clap(flatten)]
    layout: LayoutArgs,

    #[clap(flatten)]
    source: SourceArgs,
}

impl DashboardArgs {
    pub fn new(
        out: Option<PathBuf>,
        interactive: bool,
        layout: LayoutArgs,
        source: SourceArgs,
    ) -> Self {
        Self {
            out,
            interactive,
            layout,
            source,
        }
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn layout(&self) -> &LayoutArgs {
        &self.layout
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("spend-dash"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or SPEND_DASH_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("spend-dash")
        }
    })
}

/// A `PathBuf` that implements `Display` so that clap can show it as a default value.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
