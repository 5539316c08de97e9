//! The dashboard: pure aggregation over expense records, the client-side dashboard state, and CSV
//! export.

mod aggregate;
mod export;
mod view;

pub use aggregate::{
    budget_status, category_over_budget, category_spend, filter_and_sort, predictive_alert,
    projected_spend, spending_tips, total_spend, BudgetLevel, BudgetStatus, CategorySpend,
    SortOrder, DEFAULT_TIP, DEFAULT_TIP_THRESHOLD, WARNING_PERCENTAGE,
};
pub use export::{display_date, to_csv, DATE_FORMAT};
pub use view::{days_in_month, Dashboard, DashboardView, Row, ViewOptions};
