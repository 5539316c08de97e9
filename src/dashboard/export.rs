//! CSV export of expense records.

use crate::model::Expense;
use anyhow::Context;

/// The fixed date format used in exports and on the dashboard, independent of the user's locale.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The calendar date of the record's timestamp, in the timestamp's own offset. Falls back to the
/// stored string if it is not a valid timestamp.
pub fn display_date(expense: &Expense) -> String {
    match expense.timestamp() {
        Some(ts) => ts.format(DATE_FORMAT).to_string(),
        None => expense.date().to_string(),
    }
}

/// Renders records as CSV with a `Category,Amount,Date` header and `\n` line endings.
pub fn to_csv(records: &[Expense]) -> String {
    // Writing to a Vec cannot fail
    write_csv(records).unwrap_or_default()
}

fn write_csv(records: &[Expense]) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(["Category", "Amount", "Date"])
        .context("Unable to write CSV header")?;
    for expense in records {
        writer
            .write_record([
                expense.category().to_string(),
                expense.amount().plain(),
                display_date(expense),
            ])
            .context("Unable to write CSV row")?;
    }
    let bytes = writer.into_inner().context("Unable to flush CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
