//! Pure functions that derive dashboard values from a list of expenses and the budget settings.
//!
//! None of these functions fail. Degenerate inputs (a zero budget, day zero of a month, an empty
//! list) produce defined values instead of errors.

use crate::model::{Amount, Category, Expense};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Spend above this share of the budget puts the budget in the warning level.
pub const WARNING_PERCENTAGE: f64 = 80.0;

/// Categories with a share of total spend above this percentage get a spending tip.
pub const DEFAULT_TIP_THRESHOLD: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

pub const DEFAULT_TIP: &str = "No specific spending tips at the moment. Keep up the good work!";

/// How to order expenses by amount.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Keep insertion order.
    #[default]
    None,
    /// Smallest amount first.
    #[serde(alias = "low-to-high")]
    #[value(alias = "low-to-high")]
    Ascending,
    /// Largest amount first.
    #[serde(alias = "high-to-low")]
    #[value(alias = "high-to-low")]
    Descending,
}

serde_plain::derive_display_from_serialize!(SortOrder);
serde_plain::derive_fromstr_from_deserialize!(SortOrder);

/// Keeps the records whose `month` equals `month_filter` (all of them when there is no filter),
/// then orders them by amount. Sorting is stable, so records with equal amounts keep their
/// relative order. The input is not modified.
pub fn filter_and_sort(
    records: &[Expense],
    month_filter: Option<&str>,
    sort: SortOrder,
) -> Vec<Expense> {
    let mut filtered: Vec<Expense> = records
        .iter()
        .filter(|e| month_filter.map_or(true, |m| e.month() == m))
        .cloned()
        .collect();
    match sort {
        SortOrder::None => {}
        SortOrder::Ascending => filtered.sort_by(|a, b| a.amount().cmp(&b.amount())),
        SortOrder::Descending => filtered.sort_by(|a, b| b.amount().cmp(&a.amount())),
    }
    filtered
}

pub fn total_spend(records: &[Expense]) -> Amount {
    records.iter().map(Expense::amount).sum()
}

/// Spend per category, in the order each category first appears in the records.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct CategorySpend(Vec<(Category, Amount)>);

impl CategorySpend {
    pub fn get(&self, category: Category) -> Option<Amount> {
        self.0
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Amount)> + '_ {
        self.0.iter().copied()
    }

    pub fn total(&self) -> Amount {
        self.0.iter().map(|(_, amount)| *amount).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn category_spend(records: &[Expense]) -> CategorySpend {
    let mut spend: Vec<(Category, Amount)> = Vec::new();
    for expense in records {
        match spend.iter_mut().find(|(c, _)| *c == expense.category()) {
            Some((_, total)) => *total = total.saturating_add(expense.amount()),
            None => spend.push((expense.category(), expense.amount())),
        }
    }
    CategorySpend(spend)
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Normal,
    /// More than 80% of the budget is spent.
    Warning,
    /// More than 100% of the budget is spent.
    Exceeded,
}

serde_plain::derive_display_from_serialize!(BudgetLevel);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// Spend as a percentage of the budget. Infinite when the budget is zero or negative, which
    /// serializes as `null`.
    pub percentage: f64,
    pub exceeded: bool,
    pub level: BudgetLevel,
}

/// Compares spend to the budget. A budget of zero or less counts as exceeded.
pub fn budget_status(spend: Amount, budget: Amount) -> BudgetStatus {
    if budget.value() <= Decimal::ZERO {
        return BudgetStatus {
            percentage: f64::INFINITY,
            exceeded: true,
            level: BudgetLevel::Exceeded,
        };
    }
    let percentage = spend
        .percent_of(budget)
        .and_then(|p| p.to_f64())
        .unwrap_or(f64::INFINITY);
    let exceeded = spend > budget;
    let level = if exceeded {
        BudgetLevel::Exceeded
    } else if percentage > WARNING_PERCENTAGE {
        BudgetLevel::Warning
    } else {
        BudgetLevel::Normal
    };
    BudgetStatus {
        percentage,
        exceeded,
        level,
    }
}

/// Projects month-end spend from the average daily spend so far. Returns `None` on day zero.
pub fn projected_spend(spend: Amount, current_day: u32, days_in_month: u32) -> Option<Amount> {
    if current_day == 0 {
        return None;
    }
    // Multiplying first keeps whole results exact, e.g. 100 / 3 * 30 == 1000.
    let (spend, day, days) = (
        spend.value(),
        Decimal::from(current_day),
        Decimal::from(days_in_month),
    );
    let projected = spend
        .checked_mul(days)
        .and_then(|v| v.checked_div(day))
        .or_else(|| spend.checked_div(day)?.checked_mul(days))?;
    Some(Amount::new(projected))
}

/// The amount by which spend is on track to exceed the budget. Only reported while spend is still
/// within the budget; once over budget the plain budget status covers it.
pub fn predictive_alert(
    spend: Amount,
    budget: Amount,
    current_day: u32,
    days_in_month: u32,
) -> Option<Amount> {
    let projected = projected_spend(spend, current_day, days_in_month)?;
    if projected > budget && spend <= budget {
        Some(Amount::new(projected.value() - budget.value()))
    } else {
        None
    }
}

/// Categories whose spend within `records` exceeds their configured budget.
///
/// `records` is whatever set is currently displayed, normally already filtered by month, so a
/// category is judged by its filtered total rather than its all-time total.
pub fn category_over_budget(
    records: &[Expense],
    category_budgets: &BTreeMap<Category, Amount>,
) -> BTreeSet<Category> {
    category_spend(records)
        .iter()
        .filter(|(category, spend)| match category_budgets.get(category) {
            Some(budget) if !budget.is_zero() => spend > budget,
            _ => false,
        })
        .map(|(category, _)| category)
        .collect()
}

/// One tip per category whose share of total spend is above `threshold` percent, in first-seen
/// order. When no category qualifies, a single default tip.
pub fn spending_tips(records: &[Expense], threshold: Decimal) -> Vec<String> {
    let spend = category_spend(records);
    let total = spend.total();
    let mut tips = Vec::new();
    if !total.is_zero() {
        for (category, amount) in spend.iter() {
            if amount.percent_of(total).is_some_and(|share| share > threshold) {
                tips.push(format!(
                    "You are spending a lot on {category}. Consider reducing these expenses."
                ));
            }
        }
    }
    if tips.is_empty() {
        tips.push(DEFAULT_TIP.to_string());
    }
    tips
}
