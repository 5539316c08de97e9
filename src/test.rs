//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::store::ExpenseStore;
use crate::{server, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Test environment that sets up an expenses home directory with Config and an expense store.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
    store: ExpenseStore,
}

impl TestEnv {
    /// Creates a test environment with a fresh home directory and an empty store.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("expenses");
        let config = Config::create(&root, None, None).await.unwrap();
        let store = ExpenseStore::new(config.data_path());

        Self {
            _temp_dir: temp_dir,
            config,
            store,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// The store backed by this environment's data file.
    pub fn store(&self) -> &ExpenseStore {
        &self.store
    }

    /// Another store over the same data file, for handing to a server task.
    pub fn new_store(&self) -> ExpenseStore {
        ExpenseStore::new(self.config.data_path())
    }

    /// Overwrites the data file with `content`.
    pub async fn write_data_file(&self, content: &str) {
        tokio::fs::write(self.config.data_path(), content)
            .await
            .unwrap();
    }

    /// Starts a server over this environment's data file on an ephemeral local port.
    pub async fn start_server(&self) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let store = Arc::new(self.new_store());
        let task = tokio::spawn(server::serve(listener, store, async move {
            let _ = stopped.await;
        }));
        TestServer {
            url: format!("http://{addr}"),
            addr,
            stop,
            task,
        }
    }
}

/// A server started by `TestEnv::start_server`.
pub struct TestServer {
    pub url: String,
    pub addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<crate::Result<()>>,
}

impl TestServer {
    /// Signals shutdown and waits for the accept loop to exit cleanly.
    pub async fn stop(self) {
        self.stop.send(()).unwrap();
        self.task.await.unwrap().unwrap();
    }
}
