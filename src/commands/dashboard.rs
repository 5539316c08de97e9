use crate::args::{DashboardArgs, ViewArgs};
use crate::client::ApiClient;
use crate::commands::Out;
use crate::dashboard::{Dashboard, DashboardView, ViewOptions};
use crate::error::{ErrorType, IntoResult};
use crate::settings::Settings;
use crate::{Config, Result};
use chrono::Local;

/// Fetches every expense from the server and renders the dashboard for the requested view.
pub async fn dashboard(config: Config, args: DashboardArgs) -> Result<Out<DashboardView>> {
    let dashboard = load(&config, args.server().server_url(), args.view()).await?;
    let view = dashboard.view(Local::now().date_naive());
    let message = format!(
        "Showing {} of {} expenses",
        view.rows.len(),
        dashboard.expenses().len()
    );
    let report = view.to_string();
    Ok(Out::new(message, view).with_report(report))
}

/// Builds the client state from the server's records and the local settings.
pub(super) async fn load(config: &Config, server_url: &str, view: &ViewArgs) -> Result<Dashboard> {
    let settings = Settings::load(config.settings_path())
        .await
        .pub_result(ErrorType::Config)?;
    let expenses = ApiClient::new(server_url).list_expenses().await?;
    Ok(Dashboard::new(
        expenses,
        settings,
        ViewOptions::new(view.month().map(str::to_string), view.sort()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ServerArgs;
    use crate::dashboard::SortOrder;
    use crate::model::{Amount, Category, Expense, ExpenseInput};
    use crate::test::TestEnv;
    use std::str::FromStr;

    async fn seed(env: &TestEnv) {
        for (month, category, amount) in [
            ("2024-04", Category::Groceries, "450"),
            ("2024-05", Category::Groceries, "300"),
            ("2024-05", Category::Medicine, "500"),
        ] {
            let expense = Expense::new(
                month,
                category,
                Amount::from_str(amount).unwrap(),
                "2024-05-03T09:15:00.000Z",
            )
            .unwrap();
            env.store()
                .append_expense(ExpenseInput::from(&expense))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_dashboard_filters_and_sorts() {
        let env = TestEnv::new().await;
        seed(&env).await;
        let server = env.start_server().await;

        let args = DashboardArgs::new(
            ViewArgs::new(Some("2024-05".to_string()), SortOrder::Descending),
            ServerArgs::new(&server.url),
        );
        let out = dashboard(env.config(), args).await.unwrap();
        assert_eq!(out.message(), "Showing 2 of 3 expenses");

        let view = out.structure().unwrap();
        let amounts: Vec<String> = view
            .rows
            .iter()
            .map(|r| r.expense.amount().to_string())
            .collect();
        assert_eq!(amounts, vec!["₹500.00", "₹300.00"]);
        assert_eq!(view.total, Amount::from_str("800").unwrap());
        assert!(out.report().unwrap().contains("Spending by category:"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_dashboard_uses_local_budget() {
        let env = TestEnv::new().await;
        seed(&env).await;
        let mut settings = Settings::default();
        settings
            .set_budget(Amount::from_str("1000").unwrap())
            .unwrap();
        settings.save(env.config().settings_path()).await.unwrap();
        let server = env.start_server().await;

        let args = DashboardArgs::new(ViewArgs::default(), ServerArgs::new(&server.url));
        let out = dashboard(env.config(), args).await.unwrap();
        let view = out.structure().unwrap();
        assert_eq!(view.budget, Amount::from_str("1000").unwrap());
        assert!(view.status.exceeded);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_dashboard_reports_storage_failure() {
        let env = TestEnv::new().await;
        env.write_data_file("{ not a list").await;
        let server = env.start_server().await;

        let args = DashboardArgs::new(ViewArgs::default(), ServerArgs::new(&server.url));
        let err = dashboard(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);

        server.stop().await;
    }
}
