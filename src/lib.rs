//! A personal expense tracker.
//!
//! The expense server keeps every expense in one JSON file and serves it over HTTP. The client
//! commands fetch those expenses and combine them with locally stored budgets to render a
//! dashboard or a CSV export.

pub mod args;
pub mod client;
pub mod commands;
mod config;
pub mod dashboard;
mod error;
pub mod model;
pub mod server;
mod settings;
mod store;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::{Error, ErrorType, Result, ValidationError};
pub use settings::{Settings, DEFAULT_BUDGET};
pub use store::ExpenseStore;
