//! Request routing for the expense server.
//!
//! - `GET /expenses` returns every stored record.
//! - `POST /expenses` validates and appends one record.
//!
//! `/api/expenses` is accepted as an alias, since that is the path the browser page uses.

use crate::error::{Error, ErrorType, ValidationError};
use crate::model::ExpenseInput;
use crate::store::ExpenseStore;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub(crate) type Body = Full<Bytes>;

const EXPENSES_PATHS: [&str; 2] = ["/expenses", "/api/expenses"];

/// Server-side failures are logged in full; clients only get these.
const STORAGE_UNAVAILABLE: &str = "Expense storage is unavailable";
const INTERNAL_ERROR: &str = "Internal server error";

/// The JSON document sent with every non-2xx response.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
    /// For validation failures, the offending field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
            reason: None,
        }
    }
}

impl From<&ValidationError> for ErrorBody {
    fn from(e: &ValidationError) -> Self {
        Self {
            error: e.to_string(),
            field: Some(e.field().to_string()),
            reason: Some(e.reason().to_string()),
        }
    }
}

pub(crate) async fn route(
    store: &ExpenseStore,
    method: &Method,
    path: &str,
    body: &[u8],
) -> Response<Body> {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };
    if !EXPENSES_PATHS.contains(&trimmed) {
        return json_response(
            StatusCode::NOT_FOUND,
            &ErrorBody::message(format!("No such resource '{path}'")),
        );
    }
    match method {
        &Method::GET => list_expenses(store).await,
        &Method::POST => append_expense(store, body).await,
        _ => {
            let mut response = json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &ErrorBody::message(format!("Method {method} is not allowed on '{path}'")),
            );
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, POST"));
            response
        }
    }
}

async fn list_expenses(store: &ExpenseStore) -> Response<Body> {
    match store.list_expenses().await {
        Ok(expenses) => {
            debug!("Returning {} expenses", expenses.len());
            json_response(StatusCode::OK, &expenses)
        }
        Err(e) => error_response(&e),
    }
}

async fn append_expense(store: &ExpenseStore, body: &[u8]) -> Response<Body> {
    let input = match ExpenseInput::from_json(body) {
        Ok(input) => input,
        Err(e) => return validation_response(&e),
    };
    match store.append_expense(input).await {
        Ok(expense) => json_response(StatusCode::CREATED, &expense),
        Err(e) => error_response(&e),
    }
}

pub(crate) fn validation_response(e: &ValidationError) -> Response<Body> {
    json_response(StatusCode::BAD_REQUEST, &ErrorBody::from(e))
}

fn error_response(e: &Error) -> Response<Body> {
    if let Some(validation) = e.validation() {
        return validation_response(validation);
    }
    match e.error_type() {
        ErrorType::Validation => json_response(
            StatusCode::BAD_REQUEST,
            &ErrorBody::message(e.to_string()),
        ),
        ErrorType::Storage => {
            error!("Storage failure: {e}");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorBody::message(STORAGE_UNAVAILABLE),
            )
        }
        _ => {
            error!("Request failed: {e}");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorBody::message(INTERNAL_ERROR),
            )
        }
    }
}

fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response<Body> {
    let (status, bytes) = match serde_json::to_vec(value) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            error!("Unable to serialize response: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"Unable to serialize response"}"#.to_vec(),
            )
        }
    };
    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Expense;
    use crate::test::TestEnv;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn valid_body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "month": "2024-05",
            "category": "Groceries",
            "amount": 100,
            "date": "2024-05-03T09:15:00.000Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_fresh_store_is_empty_array() {
        let env = TestEnv::new().await;
        let response = route(env.store(), &Method::GET, "/expenses", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_post_then_get() {
        let env = TestEnv::new().await;
        let response = route(env.store(), &Method::POST, "/expenses", &valid_body()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["category"], "Groceries");
        assert_eq!(created["amount"], 100);

        let response = route(env.store(), &Method::GET, "/api/expenses/", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        let list = body_json(response).await;
        assert_eq!(list, json!([created]));
    }

    #[tokio::test]
    async fn test_post_invalid_is_400_naming_field() {
        let env = TestEnv::new().await;
        let body = serde_json::to_vec(&json!({
            "month": "2024-05",
            "category": "Groceries",
            "amount": -100,
            "date": "2024-05-03T09:15:00.000Z"
        }))
        .unwrap();
        let response = route(env.store(), &Method::POST, "/expenses", &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body_json(response).await;
        assert_eq!(error["field"], "amount");

        let stored: Vec<Expense> = env.store().list_expenses().await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_post_malformed_json_is_400() {
        let env = TestEnv::new().await;
        let response = route(env.store(), &Method::POST, "/expenses", b"{oops").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["field"], "body");
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let env = TestEnv::new().await;
        env.write_data_file("this is not json").await;

        let response = route(env.store(), &Method::GET, "/expenses", b"").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error = body_json(response).await;
        assert_eq!(error["error"], STORAGE_UNAVAILABLE);
        let data_path = env.config().data_path().to_string_lossy().to_string();
        assert!(!error.to_string().contains(&data_path));

        let response = route(env.store(), &Method::POST, "/expenses", &valid_body()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_path_and_method() {
        let env = TestEnv::new().await;
        let response = route(env.store(), &Method::GET, "/", b"").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = route(env.store(), &Method::DELETE, "/expenses", b"").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET, POST");
    }
}
