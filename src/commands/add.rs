use crate::args::AddArgs;
use crate::client::ApiClient;
use crate::commands::{parse_amount, parse_category, Out};
use crate::dashboard::{Dashboard, DashboardView, ViewOptions};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Expense, ExpenseInput};
use crate::settings::Settings;
use crate::{Config, Result};
use chrono::{Local, SecondsFormat, Utc};
use tracing::debug;

/// Validates an expense locally, submits it to the server and renders the dashboard with the
/// stored record added.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<DashboardView>> {
    let date = args
        .date()
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    let expense = Expense::new(
        args.month(),
        parse_category(args.category())?,
        parse_amount("amount", args.amount())?,
        date,
    )
    .map_err(|e| Error::new(ErrorType::Validation, e))?;

    let settings = Settings::load(config.settings_path())
        .await
        .pub_result(ErrorType::Config)?;

    let client = ApiClient::new(args.server().server_url());
    let expenses = client.list_expenses().await?;
    let mut dashboard = Dashboard::new(expenses, settings, ViewOptions::default());

    let stored = client.add_expense(&ExpenseInput::from(&expense)).await?;
    debug!("The server stored {stored:?}");
    dashboard.push(stored.clone());
    let view = dashboard.view(Local::now().date_naive());
    let report = view.to_string();
    Ok(Out::new(
        format!(
            "Added {} of {} for {}",
            stored.amount(),
            stored.category(),
            stored.month()
        ),
        view,
    )
    .with_report(report))
}
