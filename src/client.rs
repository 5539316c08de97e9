//! A small HTTP client for the expense server, used by the client-side commands.

use crate::error::{Error, ErrorType, IntoResult, ValidationError};
use crate::model::{Expense, ExpenseInput};
use crate::server::ErrorBody;
use crate::Result;
use anyhow::{anyhow, Context};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct ApiClient {
    expenses_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the server at `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            expenses_url: format!("{}/expenses", base_url.trim_end_matches('/')),
            http: reqwest::Client::new(),
        }
    }

    /// Fetches every stored expense.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        debug!("GET {}", self.expenses_url);
        let response = self
            .http
            .get(&self.expenses_url)
            .send()
            .await
            .with_context(|| format!("Unable to reach the expense server at {}", self.expenses_url))
            .pub_result(ErrorType::Request)?;
        read_json(response, StatusCode::OK).await
    }

    /// Submits one expense and returns the record as stored by the server.
    pub async fn add_expense(&self, input: &ExpenseInput) -> Result<Expense> {
        debug!("POST {}", self.expenses_url);
        let body = serde_json::to_string(input)
            .context("Unable to serialize expense")
            .pub_result(ErrorType::Request)?;
        let response = self
            .http
            .post(&self.expenses_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .with_context(|| format!("Unable to reach the expense server at {}", self.expenses_url))
            .pub_result(ErrorType::Request)?;
        read_json(response, StatusCode::CREATED).await
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    expected: StatusCode,
) -> Result<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .context("Unable to read the server response")
        .pub_result(ErrorType::Request)?;

    if status == expected {
        return serde_json::from_str(&text)
            .context("The server sent an unexpected response")
            .pub_result(ErrorType::Request);
    }

    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
    match (status, body) {
        (
            StatusCode::BAD_REQUEST,
            Some(ErrorBody {
                field: Some(field),
                reason: Some(reason),
                ..
            }),
        ) => Err(Error::new(
            ErrorType::Validation,
            ValidationError::new(field, reason),
        )),
        (StatusCode::INTERNAL_SERVER_ERROR, Some(body)) => Err(Error::new(
            ErrorType::Storage,
            anyhow!("The server could not complete the request: {}", body.error),
        )),
        (status, Some(body)) => Err(Error::new(
            ErrorType::Request,
            anyhow!("The server responded {status}: {}", body.error),
        )),
        (status, None) => Err(Error::new(
            ErrorType::Request,
            anyhow!("The server responded {status}: {text}"),
        )),
    }
}
