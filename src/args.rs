//! These structs provide the CLI interface for the account-book CLI.

use crate::model::{Amount, GroupBy, User};
use crate::month::MonthWindow;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// account-book: a two-person household expense tracker.
///
/// Expenses are kept in a SQLite database inside the home directory. Run `account-book init` once
/// to create it, then either record and review expenses from the command line or run
/// `account-book serve` to expose the HTTP API used by the browser front end.
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
    /// Create the home directory, its configuration file and an empty expenses database.
    Init(InitArgs),
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Record an expense.
    Insert(InsertArgs),
    /// List the expenses of a month, newest first.
    List(ListArgs),
    /// Print the monthly summary table: totals, allowance remainders and a per-group breakdown.
    Summary(SummaryArgs),
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

    /// The directory where the configuration and database are held. Defaults to ~/account-book
    #[arg(long, env = "ACCOUNT_BOOK_HOME", default_value_t = default_home())]
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

/// Args for the `account-book init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The address `account-book serve` will listen on.
    #[arg(long, default_value = crate::config::DEFAULT_LISTEN_ADDR)]
    listen: SocketAddr,
}

impl InitArgs {
    pub fn new(listen: SocketAddr) -> Self {
        Self { listen }
    }

    pub fn listen(&self) -> SocketAddr {
        self.listen
    }
}

/// Args for the `account-book serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// Overrides the address from config.json.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

impl ServeArgs {
    pub fn new(listen: Option<SocketAddr>) -> Self {
        Self { listen }
    }

    pub fn listen(&self) -> Option<SocketAddr> {
        self.listen
    }
}

/// Args for the `account-book insert` command.
///
/// The category, payment method and user are stored as given. The usual values are
/// categories 衣服, 化妆品, 电子产品, 家具, 其他; payment methods 花呗, 白条, 浦发银行信用卡, 其他;
/// users 畅, 杰.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    /// The day of the expense, YYYY-MM-DD.
    #[arg(long)]
    pub date: String,

    #[arg(long)]
    pub category: String,

    #[arg(long)]
    pub payment_method: String,

    #[arg(long, allow_hyphen_values = true)]
    pub amount: Amount,

    /// The user label, e.g. 畅. The aliases chang and jie are translated to their labels.
    #[arg(long)]
    pub user: String,
}

/// Args for the `account-book list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    /// Only list this user's expenses: chang or jie.
    #[arg(long)]
    pub user: Option<User>,

    /// The month to list, YYYY-MM. Defaults to the current month.
    #[arg(long)]
    pub month: Option<MonthWindow>,
}

/// Args for the `account-book summary` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SummaryArgs {
    /// Break the table down by category or by payment method.
    #[arg(long, value_enum, default_value_t = GroupBy::Category)]
    pub group: GroupBy,

    /// The month to summarize, YYYY-MM. Defaults to the current month.
    #[arg(long)]
    pub month: Option<MonthWindow>,
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("account-book"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or ACCOUNT_BOOK_HOME instead of relying on the default \
                directory.",
            );
            PathBuf::from("account-book")
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
    pub fn path(&self) -> &Path {
        &self.0
    }
}
