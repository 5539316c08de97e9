use clap::Parser;
use expense_tracker::args::{Args, BudgetSubcommand, Command};
use expense_tracker::{commands, Config, Result};
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
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expenses_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.port(), init_args.data_file())
                .await?
                .print()
        }

        Command::Serve(serve_args) => {
            let config = Config::load(home).await?;
            commands::serve(config, serve_args.port(), serve_args.host())
                .await?
                .print()
        }

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            commands::add(config, add_args.clone()).await?.print()
        }

        Command::Dashboard(dashboard_args) => {
            let config = Config::load(home).await?;
            commands::dashboard(config, dashboard_args.clone())
                .await?
                .print()
        }

        Command::Budget(budget_args) => {
            let config = Config::load(home).await?;
            match budget_args.action() {
                BudgetSubcommand::Set { amount } => {
                    commands::budget_set(config, amount).await?.print()
                }
                BudgetSubcommand::Category { category, amount } => {
                    commands::budget_category(config, category, amount)
                        .await?
                        .print()
                }
                BudgetSubcommand::Show => commands::budget_show(config).await?.print(),
            }
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(config, export_args.clone()).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this package only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
