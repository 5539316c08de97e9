use crate::dashboard::aggregate::{
    budget_status, category_over_budget, category_spend, filter_and_sort, predictive_alert,
    projected_spend, spending_tips, total_spend, BudgetLevel, BudgetStatus, CategorySpend,
    SortOrder, DEFAULT_TIP_THRESHOLD,
};
use crate::dashboard::export::{display_date, to_csv};
use crate::model::{Amount, Expense};
use crate::settings::Settings;
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// The filter and sort currently applied to the dashboard.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct ViewOptions {
    pub month: Option<String>,
    pub sort: SortOrder,
}

impl ViewOptions {
    pub fn new(month: Option<String>, sort: SortOrder) -> Self {
        Self { month, sort }
    }
}

/// The client's state: its copy of the stored expenses, the local budget settings and the current
/// view options. Every user action changes this state and then asks for a fresh `view`.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    expenses: Vec<Expense>,
    settings: Settings,
    options: ViewOptions,
}

impl Dashboard {
    pub fn new(expenses: Vec<Expense>, settings: Settings, options: ViewOptions) -> Self {
        Self {
            expenses,
            settings,
            options,
        }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Adds a record that the server has accepted.
    pub fn push(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    pub fn set_options(&mut self, options: ViewOptions) {
        self.options = options;
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// The records currently displayed, after filtering and sorting.
    pub fn displayed(&self) -> Vec<Expense> {
        filter_and_sort(
            &self.expenses,
            self.options.month.as_deref(),
            self.options.sort,
        )
    }

    pub fn csv(&self) -> String {
        to_csv(&self.displayed())
    }

    /// Computes everything the dashboard shows. `today` drives the month-end projection.
    pub fn view(&self, today: NaiveDate) -> DashboardView {
        let displayed = self.displayed();
        let over_budget = category_over_budget(&displayed, &self.settings.category_budgets());
        let total = total_spend(&displayed);
        let budget = self.settings.budget();
        let day = today.day();
        let days = days_in_month(today);

        DashboardView {
            rows: displayed
                .iter()
                .map(|e| Row {
                    over_budget: over_budget.contains(&e.category()),
                    expense: e.clone(),
                })
                .collect(),
            total,
            budget,
            status: budget_status(total, budget),
            projected: projected_spend(total, day, days),
            predictive_alert: predictive_alert(total, budget, day, days),
            breakdown: category_spend(&displayed),
            tips: spending_tips(&displayed, DEFAULT_TIP_THRESHOLD),
        }
    }
}

/// The number of days in the month that contains `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (next, NaiveDate::from_ymd_opt(year, month, 1)) {
        (Some(next), Some(first)) => (next - first).num_days() as u32,
        // Only reachable at the very end of chrono's supported range
        _ => 31,
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Row {
    pub expense: Expense,
    /// The row's category has exceeded its budget within the displayed records.
    pub over_budget: bool,
}

/// Display-ready dashboard values.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub rows: Vec<Row>,
    pub total: Amount,
    pub budget: Amount,
    pub status: BudgetStatus,
    pub projected: Option<Amount>,
    pub predictive_alert: Option<Amount>,
    pub breakdown: CategorySpend,
    pub tips: Vec<String>,
}

impl Display for DashboardView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<22} {:>14}  {}", "Category", "Amount", "Date")?;
        for row in &self.rows {
            let marker = if row.over_budget { " (over budget)" } else { "" };
            writeln!(
                f,
                "{:<22} {:>14}  {}{marker}",
                row.expense.category().to_string(),
                row.expense.amount().to_string(),
                display_date(&row.expense),
            )?;
        }
        if self.rows.is_empty() {
            writeln!(f, "(no expenses)")?;
        }
        writeln!(f)?;

        writeln!(f, "Total spend: {}", self.total)?;
        let percentage = if self.status.percentage.is_finite() {
            format!("{:.2}%", self.status.percentage)
        } else {
            "-".to_string()
        };
        let level = match self.status.level {
            BudgetLevel::Normal => "",
            BudgetLevel::Warning => " Approaching budget",
            BudgetLevel::Exceeded => " Budget Exceeded!",
        };
        writeln!(f, "Budget: {} ({percentage}){level}", self.budget)?;
        if let Some(projected) = self.projected {
            writeln!(f, "Projected month-end spend: {projected}")?;
        }
        if let Some(overage) = self.predictive_alert {
            writeln!(
                f,
                "Warning: You are on track to exceed your budget by {overage}"
            )?;
        }

        if !self.breakdown.is_empty() {
            writeln!(f)?;
            writeln!(f, "Spending by category:")?;
            for (category, amount) in self.breakdown.iter() {
                let share = amount
                    .percent_of(self.total)
                    .and_then(|p| p.to_f64())
                    .unwrap_or_default();
                writeln!(f, "  {category}: {amount} ({share:.1}%)")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Spending tips:")?;
        for tip in &self.tips {
            writeln!(f, "  - {tip}")?;
        }
        Ok(())
    }
}
