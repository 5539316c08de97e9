use crate::commands::{parse_amount, parse_category, Out};
use crate::error::{ErrorType, IntoResult};
use crate::settings::Settings;
use crate::{Config, Result};
use anyhow::Context;

/// Sets the overall monthly budget.
pub async fn budget_set(config: Config, amount: &str) -> Result<Out<Settings>> {
    let budget = parse_amount("budget", amount)?;
    let mut settings = load(&config).await?;
    settings
        .set_budget(budget)
        .pub_result(ErrorType::Validation)?;
    save(&config, &settings).await?;
    Ok(Out::new(format!("Budget set to {budget}"), settings))
}

/// Sets the budget for one category. A zero amount clears it.
pub async fn budget_category(
    config: Config,
    category: &str,
    amount: &str,
) -> Result<Out<Settings>> {
    let category = parse_category(category)?;
    let budget = parse_amount("budget", amount)?;
    let mut settings = load(&config).await?;
    settings
        .set_category_budget(category, budget)
        .pub_result(ErrorType::Validation)?;
    save(&config, &settings).await?;
    let message = match settings.category_budget(category) {
        Some(b) => format!("Budget for {category} set to {b}"),
        None => format!("Budget for {category} cleared"),
    };
    Ok(Out::new(message, settings))
}

/// Prints the current budgets.
pub async fn budget_show(config: Config) -> Result<Out<Settings>> {
    let settings = load(&config).await?;
    let report = settings.to_string();
    Ok(Out::new(
        format!("Settings are stored in {}", config.settings_path().display()),
        settings,
    )
    .with_report(report))
}

async fn load(config: &Config) -> Result<Settings> {
    Settings::load(config.settings_path())
        .await
        .pub_result(ErrorType::Config)
}

async fn save(config: &Config, settings: &Settings) -> Result<()> {
    settings
        .save(config.settings_path())
        .await
        .context("Unable to save budget settings")
        .pub_result(ErrorType::Config)
}
