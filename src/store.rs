//! The expense store: a durable, append-only list of expense records kept in one JSON file.
//!
//! Appends are a read-modify-write cycle on the whole file. The cycle runs under a mutex owned by
//! the store, and the new contents are written to a temporary file and renamed into place, so
//! concurrent appends never lose records and a crash mid-write never leaves a truncated file.

use crate::error::{ErrorType, IntoResult};
use crate::model::{Expense, ExpenseInput};
use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct ExpenseStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ExpenseStore {
    /// Creates a store backed by the file at `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every stored record in insertion order. A missing or empty file is an empty list.
    ///
    /// # Errors
    /// - `ErrorType::Storage` if the file cannot be read or does not hold a list of expenses.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.read_all().await.pub_result(ErrorType::Storage)
    }

    /// Validates `input` and appends it to the stored collection, returning the stored record.
    ///
    /// # Errors
    /// - `ErrorType::Validation` naming the offending field if the record is invalid. Nothing is
    ///   written in that case.
    /// - `ErrorType::Storage` if the collection cannot be read or written. The previously stored
    ///   collection is left intact.
    pub async fn append_expense(&self, input: ExpenseInput) -> Result<Expense> {
        let expense = match input.validate() {
            Ok(expense) => expense,
            Err(e) => {
                warn!("Rejected expense: {e}");
                return Err(crate::Error::new(ErrorType::Validation, e));
            }
        };
        self.append(expense.clone())
            .await
            .pub_result(ErrorType::Storage)?;
        Ok(expense)
    }

    async fn append(&self, expense: Expense) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut expenses = self.read_all().await?;
        expenses.push(expense);

        if let Some(parent) = self.path.parent() {
            utils::make_dir(parent).await?;
        }
        let data =
            serde_json::to_string_pretty(&expenses).context("Unable to serialize expenses")?;
        utils::write_atomic(&self.path, data)
            .await
            .context("Unable to save expenses")?;
        debug!(
            "Stored expense #{} in {}",
            expenses.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn read_all(&self) -> anyhow::Result<Vec<Expense>> {
        let content = match utils::read_optional(&self.path)
            .await
            .context("Unable to read expenses")?
        {
            None => return Ok(Vec::new()),
            Some(content) => content,
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).with_context(|| {
            format!(
                "The expenses file at {} is not a valid list of expenses",
                self.path.display()
            )
        })
    }
}
