//! These structs provide the CLI interface for the expense CLI.

use crate::commands::OutputFormat;
use crate::model::{Category, Source};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// expense: Record household expenses to a Google sheet and summarize them.
///
/// Expenses are appended through a Google Form and read back from the sheet the form writes to.
/// The `show` command prints the history for a date range, the total, a per-category breakdown,
/// the daily trend and the largest expenses. Every load and every submission is recorded in an
/// audit log through a second Google Form.
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
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. You need three URLs:
    ///
    /// - The URL of the Google Sheet holding the expenses, passed as --sheet-url.
    ///
    /// - The formResponse URL of the Google Form that appends to that sheet, passed as
    ///   --form-url.
    ///
    /// - The formResponse URL of the Google Form that appends to the audit log, passed as
    ///   --log-form-url.
    Init(InitArgs),
    /// Submit a new expense.
    Add(AddArgs),
    /// Print the dashboard for a date range.
    Show(ShowArgs),
    /// Discard the cached copy of the expense sheet.
    Refresh,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and cache are held. Defaults to ~/expense-dash
    #[arg(long, env = "EXPENSE_HOME", default_value_t = default_expense_home())]
    expense_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expense_home: PathBuf) -> Self {
        Self {
            log_level,
            expense_home: expense_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expense_home(&self) -> &DisplayPath {
        &self.expense_home
    }
}

/// (Not shown): Args for the `expense init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,

    /// The formResponse URL of the expense form.
    #[arg(long)]
    form_url: String,

    /// The formResponse URL of the audit log form.
    #[arg(long)]
    log_form_url: String,
}

impl InitArgs {
    pub fn new(
        sheet_url: impl Into<String>,
        form_url: impl Into<String>,
        log_form_url: impl Into<String>,
    ) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            form_url: form_url.into(),
            log_form_url: log_form_url.into(),
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn form_url(&self) -> &str {
        &self.form_url
    }

    pub fn log_form_url(&self) -> &str {
        &self.log_form_url
    }
}

/// (Not shown): Args for the `expense add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The date of the expense, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// What the money was spent on.
    #[arg(long)]
    description: String,

    /// One of: Makan, Jajan, Belanja, Transportasi, Laundry, Lain-Lain
    #[arg(long)]
    category: Category,

    /// The amount in rupiah, a whole number.
    #[arg(long)]
    amount: u64,

    /// Who paid. One of: BRI, Suami, Istri
    #[arg(long)]
    source: Source,
}

impl AddArgs {
    pub fn new(
        date: Option<NaiveDate>,
        description: impl Into<String>,
        category: Category,
        amount: u64,
        source: Source,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            category,
            amount,
            source,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn source(&self) -> &Source {
        &self.source
    }
}

/// (Not shown): Args for the `expense show` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ShowArgs {
    /// A date to filter the history by, YYYY-MM-DD. Give it once for a single day or twice for
    /// a start and an end date. Defaults to today.
    #[arg(long = "date")]
    dates: Vec<NaiveDate>,

    /// Download the sheet even if a cached copy is still fresh.
    #[arg(long)]
    refresh: bool,

    /// How to print the dashboard.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ShowArgs {
    pub fn new(dates: Vec<NaiveDate>, refresh: bool, format: OutputFormat) -> Self {
        Self {
            dates,
            refresh,
            format,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn refresh(&self) -> bool {
        self.refresh
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn default_expense_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expense-dash"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expense-home or EXPENSE_HOME instead of relying on the \
                default directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("expense-dash")
        }
    })
}

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
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
