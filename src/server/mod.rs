//! The expense server: JSON over HTTP/1.1 in front of an `ExpenseStore`.
//!
//! Each accepted connection is served on its own task. Request bodies are read in full (up to
//! `MAX_BODY_BYTES`) before routing.

mod routes;

pub(crate) use routes::ErrorBody;

use crate::error::{ErrorType, IntoResult, ValidationError};
use crate::store::ExpenseStore;
use crate::Result;
use anyhow::Context;
use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Requests with a larger body are rejected.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Binds `addr` and serves `store` until Ctrl-C is pressed.
pub async fn run(addr: SocketAddr, store: ExpenseStore) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))
        .pub_result(ErrorType::Service)?;
    info!("Server is running on http://{addr}");
    info!("Storing expenses in {}", store.path().display());
    serve(listener, Arc::new(store), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Accepts connections on `listener` until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, store: Arc<ExpenseStore>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    // Usually transient, e.g. too many open files
                    warn!("Failed to accept a connection: {e}");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            },
            _ = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
        };

        let store = store.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| handle(store.clone(), req));
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!("Connection from {peer} ended with an error: {e}");
            }
        });
    }
}

async fn handle<B>(
    store: Arc<ExpenseStore>,
    req: Request<B>,
) -> std::result::Result<Response<routes::Body>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    debug!("{method} {path}");

    let body = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let error = ValidationError::new("body", format!("unable to read request body: {e}"));
            return Ok(routes::validation_response(&error));
        }
    };
    Ok(routes::route(&store, &method, &path, &body).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::model::{Category, ExpenseInput};
    use crate::test::TestEnv;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::{Method, StatusCode};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    /// Reads until the server closes the connection. A reset after the response has arrived is
    /// tolerated.
    async fn read_response(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn input(category: &str, amount: f64) -> ExpenseInput {
        ExpenseInput {
            month: Some("2024-05".to_string()),
            category: Some(category.to_string()),
            amount: Some(serde_json::json!(amount)),
            date: Some("2024-05-03T09:15:00.000Z".to_string()),
        }
    }

    #[tokio::test]
    async fn test_client_round_trip() {
        let env = TestEnv::new().await;
        let server = env.start_server().await;
        let client = ApiClient::new(&server.url);

        assert!(client.list_expenses().await.unwrap().is_empty());
        let stored = client.add_expense(&input("Medicine", 500.0)).await.unwrap();
        assert_eq!(stored.category(), Category::Medicine);

        let listed = client.list_expenses().await.unwrap();
        assert_eq!(listed, vec![stored]);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_client_sees_validation_error() {
        let env = TestEnv::new().await;
        let server = env.start_server().await;
        let client = ApiClient::new(&server.url);

        let err = client
            .add_expense(&input("Travel", 5.0))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(err.validation().unwrap().field(), "category");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_raw_request_for_unknown_path() {
        let env = TestEnv::new().await;
        let server = env.start_server().await;

        let mut stream = TcpStream::connect(server.addr).await.unwrap();
        stream
            .write_all(b"GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let response = read_response(&mut stream).await;
        assert!(response.starts_with("HTTP/1.1 404"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let env = TestEnv::new().await;
        let document = serde_json::to_vec(&input("Groceries", 10.0)).unwrap();
        // A valid document padded with whitespace to one byte over the limit
        let mut body = document.clone();
        body.resize(MAX_BODY_BYTES + 1, b' ');
        let req = Request::builder()
            .method(Method::POST)
            .uri("/expenses")
            .body(Full::new(Bytes::from(body)))
            .unwrap();

        let response = handle(Arc::new(env.new_store()), req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error.field.as_deref(), Some("body"));
        assert!(!env.config().data_path().exists());

        // The same document within the limit is accepted
        let req = Request::builder()
            .method(Method::POST)
            .uri("/expenses")
            .body(Full::new(Bytes::from(document)))
            .unwrap();
        let response = handle(Arc::new(env.new_store()), req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
