//! Types that represent the core data model, such as `Expense` and `Category`.
mod amount;
mod category;
mod expense;

pub use amount::{Amount, AmountError, CURRENCY};
pub use category::Category;
pub use expense::{Expense, ExpenseInput};
