//! Command handlers for the expenses CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod budget;
mod dashboard;
mod export;
mod init;
mod serve;

use crate::error::{Error, ErrorType, ValidationError};
use crate::model::{Amount, Category};
use crate::Result;
use serde::Serialize;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::{debug, info};

pub use add::add;
pub use budget::{budget_category, budget_set, budget_show};
pub use dashboard::dashboard;
pub use export::{export, Export};
pub use init::init;
pub use serve::serve;

/// The output type for a command. This allows the command to return a consistent message,
/// optionally a report for stdout, and optionally structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Text meant for stdout, such as a rendered dashboard or CSV.
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

    /// Attach text that `print` writes to stdout.
    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.report = Some(report.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the report (if it exists) to stdout, the message to `info!` and the structured data
    /// (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(report) = self.report() {
            print!("{report}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

fn parse_amount(field: &str, s: &str) -> Result<Amount> {
    Amount::from_str(s).map_err(|e| {
        Error::new(
            ErrorType::Validation,
            ValidationError::new(field, e.to_string()),
        )
    })
}

fn parse_category(s: &str) -> Result<Category> {
    Category::from_str(s).map_err(|_| {
        Error::new(
            ErrorType::Validation,
            ValidationError::new(
                "category",
                format!("'{s}' is not one of: {}", Category::names()),
            ),
        )
    })
}
