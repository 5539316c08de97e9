//! Client-local budget settings.
//!
//! These live in `$EXPENSES_HOME/settings.json` and are read and written by the client commands
//! only. They are never sent to the expense server.

use crate::model::{Amount, Category};
use crate::utils;
use anyhow::{ensure, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// The overall monthly budget used when none has been set.
pub const DEFAULT_BUDGET: Amount = Amount::new(Decimal::from_parts(80000, 0, 0, false, 0));

/// The overall budget and the optional per-category budgets.
///
/// Example file:
/// ```json
/// {
///   "budget": 80000,
///   "category_budgets": {
///     "Groceries": 12000,
///     "Vehicle Expenses": 5000
///   }
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_budget")]
    budget: Amount,
    #[serde(default)]
    category_budgets: BTreeMap<Category, Amount>,
}

fn default_budget() -> Amount {
    DEFAULT_BUDGET
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            category_budgets: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`. A missing file means default settings.
    pub async fn load(path: &Path) -> Result<Self> {
        match utils::read_optional(path).await? {
            None => Ok(Self::default()),
            Some(content) if content.trim().is_empty() => Ok(Self::default()),
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse settings file at {}", path.display())),
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize settings")?;
        utils::write_atomic(path, data)
            .await
            .context("Unable to write settings file")
    }

    pub fn budget(&self) -> Amount {
        self.budget
    }

    pub fn set_budget(&mut self, budget: Amount) -> Result<()> {
        ensure!(!budget.is_negative(), "The budget must not be negative");
        self.budget = budget;
        Ok(())
    }

    /// The configured budget for `category`, if one is set. A zero budget counts as unset.
    pub fn category_budget(&self, category: Category) -> Option<Amount> {
        self.category_budgets
            .get(&category)
            .copied()
            .filter(|b| !b.is_zero() && !b.is_negative())
    }

    /// Sets the budget for `category`. Setting it to zero removes it.
    pub fn set_category_budget(&mut self, category: Category, budget: Amount) -> Result<()> {
        ensure!(
            !budget.is_negative(),
            "The budget for {category} must not be negative"
        );
        if budget.is_zero() {
            self.category_budgets.remove(&category);
        } else {
            self.category_budgets.insert(category, budget);
        }
        Ok(())
    }

    /// The configured category budgets, keyed by category.
    pub fn category_budgets(&self) -> BTreeMap<Category, Amount> {
        Category::ALL
            .iter()
            .filter_map(|&c| self.category_budget(c).map(|b| (c, b)))
            .collect()
    }
}

impl Display for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Budget: {}", self.budget)?;
        for category in Category::ALL {
            match self.category_budget(category) {
                Some(b) => writeln!(f, "  {category}: {b}")?,
                None => writeln!(f, "  {category}: -")?,
            }
        }
        Ok(())
    }
}
