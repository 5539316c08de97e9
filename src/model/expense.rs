use crate::error::ValidationError;
use crate::model::{Amount, Category};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One persisted expense entry. Records are immutable once stored and are ordered by insertion.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The month the expense is filed under, either `YYYY-MM` or an English month name.
    pub(crate) month: String,
    pub(crate) category: Category,
    pub(crate) amount: Amount,
    /// An ISO-8601 timestamp, stored exactly as it was received.
    pub(crate) date: String,
}

impl Expense {
    /// Creates a validated record.
    pub fn new(
        month: impl Into<String>,
        category: Category,
        amount: Amount,
        date: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let expense = Self {
            month: month.into(),
            category,
            amount,
            date: date.into(),
        };
        expense.validate()?;
        Ok(expense)
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// The parsed timestamp, or `None` if the stored string is not a valid timestamp. Records
    /// written by this program always parse, but a hand-edited data file may not.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.date)
    }

    /// Checks the record against the data model invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_month(&self.month)?;
        if self.amount.is_negative() {
            return Err(ValidationError::new("amount", "must not be negative"));
        }
        if !self.amount.is_representable() {
            return Err(ValidationError::new(
                "amount",
                format!("{} has more precision than can be stored", self.amount.plain()),
            ));
        }
        if parse_timestamp(&self.date).is_none() {
            return Err(ValidationError::new(
                "date",
                format!("'{}' is not an ISO-8601 timestamp", self.date),
            ));
        }
        Ok(())
    }
}

/// An expense as submitted by a client, before validation.
///
/// Every field is optional and loosely typed so that a bad document can be rejected with a message
/// that names the offending field instead of a generic parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInput {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub date: Option<String>,
}

impl ExpenseInput {
    /// Parses a JSON request body.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body)
            .map_err(|e| ValidationError::new("body", format!("not a valid expense document: {e}")))
    }

    /// Validates the input, producing a record that satisfies the data model invariants.
    pub fn validate(self) -> Result<Expense, ValidationError> {
        let month = self
            .month
            .ok_or_else(|| ValidationError::new("month", "is required"))?;

        let category = self
            .category
            .ok_or_else(|| ValidationError::new("category", "is required"))?;
        let category = Category::from_str(&category).map_err(|_| {
            ValidationError::new(
                "category",
                format!("'{category}' is not one of: {}", Category::names()),
            )
        })?;

        let amount = match self.amount {
            None | Some(serde_json::Value::Null) => {
                return Err(ValidationError::new("amount", "is required"))
            }
            Some(value) => serde_json::from_value::<Amount>(value)
                .map_err(|e| ValidationError::new("amount", e.to_string()))?,
        };

        let date = self
            .date
            .ok_or_else(|| ValidationError::new("date", "is required"))?;

        Expense::new(month, category, amount, date)
    }
}

impl From<&Expense> for ExpenseInput {
    fn from(expense: &Expense) -> Self {
        Self {
            month: Some(expense.month.clone()),
            category: Some(expense.category.to_string()),
            amount: serde_json::to_value(expense.amount).ok(),
            date: Some(expense.date.clone()),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s.trim()).ok()
}

/// Accepts `YYYY-MM` (what an HTML month input produces) or an English month name such as
/// `March` or `Mar`.
fn validate_month(month: &str) -> Result<(), ValidationError> {
    let trimmed = month.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("month", "must not be empty"));
    }
    if trimmed.len() != month.len() {
        return Err(ValidationError::new(
            "month",
            format!("'{month}' must not have surrounding whitespace"),
        ));
    }
    if trimmed.len() == 7
        && NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").is_ok()
    {
        return Ok(());
    }
    if chrono::Month::from_str(trimmed).is_ok() {
        return Ok(());
    }
    Err(ValidationError::new(
        "month",
        format!("'{month}' is neither YYYY-MM nor a month name"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> ExpenseInput {
        serde_json::from_value(value).unwrap()
    }

    fn field_of(value: serde_json::Value) -> String {
        input(value).validate().unwrap_err().field().to_string()
    }

    #[test]
    fn test_valid_input() {
        let expense = input(json!({
            "month": "2024-05",
            "category": "Vehicle Expenses",
            "amount": 1250.5,
            "date": "2024-05-03T09:15:00.000Z"
        }))
        .validate()
        .unwrap();
        assert_eq!(expense.month(), "2024-05");
        assert_eq!(expense.category(), Category::VehicleExpenses);
        assert_eq!(expense.amount().plain(), "1250.5");
        assert_eq!(expense.date(), "2024-05-03T09:15:00.000Z");
    }

    #[test]
    fn test_month_name_is_valid() {
        let expense = input(json!({
            "month": "January",
            "category": "Groceries",
            "amount": 10,
            "date": "2024-01-03T09:15:00+05:30"
        }))
        .validate();
        assert!(expense.is_ok());
    }

    #[test]
    fn test_missing_fields_are_named() {
        assert_eq!(field_of(json!({})), "month");
        assert_eq!(field_of(json!({"month": "2024-05"})), "category");
        assert_eq!(
            field_of(json!({"month": "2024-05", "category": "Clothes"})),
            "amount"
        );
        assert_eq!(
            field_of(json!({"month": "2024-05", "category": "Clothes", "amount": 5})),
            "date"
        );
    }

    #[test]
    fn test_bad_values_are_named() {
        let base = |k: &str, v: serde_json::Value| {
            let mut doc = json!({
                "month": "2024-05",
                "category": "Clothes",
                "amount": 5,
                "date": "2024-05-03T09:15:00Z"
            });
            doc[k] = v;
            field_of(doc)
        };
        assert_eq!(base("month", json!("2024-13")), "month");
        assert_eq!(base("month", json!("Smarch")), "month");
        assert_eq!(base("month", json!("")), "month");
        assert_eq!(base("month", json!(" 2024-05 ")), "month");
        assert_eq!(base("category", json!("Travel")), "category");
        assert_eq!(base("amount", json!(-1)), "amount");
        assert_eq!(base("amount", json!("lots")), "amount");
        assert_eq!(base("amount", json!(null)), "amount");
        assert_eq!(base("amount", json!("1234567890.123456789")), "amount");
        assert_eq!(base("date", json!("yesterday")), "date");
    }

    #[test]
    fn test_zero_amount_is_valid() {
        let expense = input(json!({
            "month": "2024-05",
            "category": "Others",
            "amount": 0,
            "date": "2024-05-03T09:15:00Z"
        }))
        .validate();
        assert!(expense.is_ok());
    }

    #[test]
    fn test_from_json_rejects_malformed_body() {
        let err = ExpenseInput::from_json(b"{not json").unwrap_err();
        assert_eq!(err.field(), "body");
        let err = ExpenseInput::from_json(b"[1, 2]").unwrap_err();
        assert_eq!(err.field(), "body");
    }

    #[test]
    fn test_record_json_shape() {
        let expense = Expense::new(
            "2024-05",
            Category::Medicine,
            Amount::from_str("500").unwrap(),
            "2024-05-03T09:15:00.000Z",
        )
        .unwrap();
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(
            json,
            json!({
                "month": "2024-05",
                "category": "Medicine",
                "amount": 500,
                "date": "2024-05-03T09:15:00.000Z"
            })
        );
    }

    #[test]
    fn test_input_from_expense_round_trips() {
        let expense = Expense::new(
            "May",
            Category::Insurance,
            Amount::from_str("99.99").unwrap(),
            "2024-05-03T09:15:00Z",
        )
        .unwrap();
        let back = ExpenseInput::from(&expense).validate().unwrap();
        assert_eq!(back, expense);
    }
}
