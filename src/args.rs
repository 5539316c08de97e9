//! These structs provide the CLI interface for the expenses CLI.

use crate::client::DEFAULT_SERVER_URL;
use crate::dashboard::SortOrder;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A personal expense tracker.
///
/// Run `expenses serve` to start the expense server, which keeps every expense in a single JSON
/// file. The other commands talk to that server: `add` records an expense, `dashboard` shows your
/// spending against your budget and `export` writes a CSV file. Budgets are kept locally and are
/// managed with `expenses budget`.
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
    /// Create the home directory and initialize the configuration files.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/expenses, pass --expenses-home or set EXPENSES_HOME to put it somewhere else.
    Init(InitArgs),
    /// Run the expense server.
    Serve(ServeArgs),
    /// Record an expense and show the updated dashboard.
    Add(AddArgs),
    /// Show spending, budget status and tips.
    Dashboard(DashboardArgs),
    /// Show or change your budgets.
    Budget(BudgetArgs),
    /// Write the displayed expenses to a CSV file.
    Export(ExportArgs),
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

    /// The directory where configuration and expense data is held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expenses_home: PathBuf) -> Self {
        Self {
            log_level,
            expenses_home: expenses_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// (Not shown): Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The port the server will listen on. Defaults to 8080.
    #[arg(long)]
    port: Option<u16>,

    /// Where to store expenses. Relative paths are resolved against the home directory. Defaults
    /// to data/expenses.json.
    #[arg(long)]
    data_file: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(port: Option<u16>, data_file: Option<PathBuf>) -> Self {
        Self { port, data_file }
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }
}

/// (Not shown): Args for the `expenses serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// The port to listen on. Overrides the port in config.json.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// The address to listen on.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

impl ServeArgs {
    pub fn new(port: Option<u16>, host: impl Into<String>) -> Self {
        Self {
            port,
            host: host.into(),
        }
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// The server connection shared by the client commands.
#[derive(Debug, Parser, Clone)]
pub struct ServerArgs {
    /// The URL of the expense server.
    #[arg(long, env = "EXPENSES_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
}

impl ServerArgs {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

/// (Not shown): Args for the `expenses add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The month the expense belongs to, e.g. 2024-05 or May.
    #[arg(long)]
    month: String,

    /// One of: Groceries, Medicine, Clothes, Insurance, "Vehicle Expenses",
    /// "Housing Maintenance", Others.
    #[arg(long)]
    category: String,

    /// The amount spent, e.g. 1400 or 1,400.50.
    #[arg(long)]
    amount: String,

    /// When the expense was recorded, as an RFC 3339 timestamp. Defaults to now.
    #[arg(long)]
    date: Option<String>,

    #[clap(flatten)]
    server: ServerArgs,
}

impl AddArgs {
    pub fn new(
        month: impl Into<String>,
        category: impl Into<String>,
        amount: impl Into<String>,
        date: Option<String>,
        server: ServerArgs,
    ) -> Self {
        Self {
            month: month.into(),
            category: category.into(),
            amount: amount.into(),
            date,
            server,
        }
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn server(&self) -> &ServerArgs {
        &self.server
    }
}

/// The filter and sort applied to displayed expenses.
#[derive(Debug, Parser, Clone, Default)]
pub struct ViewArgs {
    /// Only show expenses for this month, e.g. 2024-05. Shows all months when omitted.
    #[arg(long)]
    month: Option<String>,

    /// Order expenses by amount.
    #[arg(long, value_enum, default_value_t = SortOrder::None)]
    sort: SortOrder,
}

impl ViewArgs {
    pub fn new(month: Option<String>, sort: SortOrder) -> Self {
        Self { month, sort }
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }
}

/// (Not shown): Args for the `expenses dashboard` command.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    #[clap(flatten)]
    view: ViewArgs,

    #[clap(flatten)]
    server: ServerArgs,
}

impl DashboardArgs {
    pub fn new(view: ViewArgs, server: ServerArgs) -> Self {
        Self { view, server }
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }

    pub fn server(&self) -> &ServerArgs {
        &self.server
    }
}

/// (Not shown): Args for the `expenses budget` command.
#[derive(Debug, Parser, Clone)]
pub struct BudgetArgs {
    #[command(subcommand)]
    action: BudgetSubcommand,
}

impl BudgetArgs {
    pub fn new(action: BudgetSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &BudgetSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum BudgetSubcommand {
    /// Set the overall monthly budget.
    Set {
        /// The budget, e.g. 80000.
        amount: String,
    },
    /// Set the budget for one category. A budget of 0 clears it.
    Category {
        /// The category, e.g. Groceries.
        category: String,
        /// The budget, e.g. 12000.
        amount: String,
    },
    /// Print the current budgets.
    Show,
}

/// (Not shown): Args for the `expenses export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    view: ViewArgs,

    /// The file to write, or - for stdout.
    #[arg(long, default_value = "expenses.csv")]
    output: PathBuf,

    #[clap(flatten)]
    server: ServerArgs,
}

impl ExportArgs {
    pub fn new(view: ViewArgs, output: impl Into<PathBuf>, server: ServerArgs) -> Self {
        Self {
            view,
            output: output.into(),
            server,
        }
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn server(&self) -> &ServerArgs {
        &self.server
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("expenses")
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("expenses").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_add() {
        let args = parse(&[
            "--expenses-home",
            "/tmp/x",
            "add",
            "--month",
            "2024-05",
            "--category",
            "Vehicle Expenses",
            "--amount",
            "1,400",
            "--server-url",
            "http://127.0.0.1:9000",
        ]);
        assert_eq!(args.common().expenses_home().path(), Path::new("/tmp/x"));
        let Command::Add(add) = args.command() else {
            panic!("expected add, got {:?}", args.command());
        };
        assert_eq!(add.category(), "Vehicle Expenses");
        assert_eq!(add.amount(), "1,400");
        assert_eq!(add.date(), None);
        assert_eq!(add.server().server_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_parse_export_sort_alias() {
        let args = parse(&["export", "--sort", "high-to-low", "--output", "-"]);
        let Command::Export(export) = args.command() else {
            panic!("expected export, got {:?}", args.command());
        };
        assert_eq!(export.view().sort(), SortOrder::Descending);
        assert_eq!(export.view().month(), None);
        assert_eq!(export.output(), Path::new("-"));
    }

    #[test]
    fn test_parse_budget_category() {
        let args = parse(&["budget", "category", "Groceries", "12000"]);
        let Command::Budget(budget) = args.command() else {
            panic!("expected budget, got {:?}", args.command());
        };
        match budget.action() {
            BudgetSubcommand::Category { category, amount } => {
                assert_eq!(category, "Groceries");
                assert_eq!(amount, "12000");
            }
            other => panic!("expected category, got {other:?}"),
        }
    }

    #[test]
    fn test_log_level() {
        let args = parse(&["--log-level", "debug", "budget", "show"]);
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }
}
