use crate::commands::Out;
use crate::error::{Error, ErrorType};
use crate::store::ExpenseStore;
use crate::{server, Config, Result};
use anyhow::anyhow;
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

/// Runs the expense server until Ctrl-C is pressed.
///
/// # Arguments
/// - `config` - Supplies the data file location and the default port.
/// - `port` - Overrides the port from `config.json` when given.
/// - `host` - The address to listen on, e.g. `127.0.0.1`.
pub async fn serve(config: Config, port: Option<u16>, host: &str) -> Result<Out<()>> {
    let addr = listen_addr(host, port.unwrap_or(config.port()))?;
    debug!("Using data file {}", config.data_path().display());
    let store = ExpenseStore::new(config.data_path());
    server::run(addr, store).await?;
    Ok("The expense server has stopped".into())
}

fn listen_addr(host: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = host.parse().map_err(|e| {
        Error::new(
            ErrorType::Config,
            anyhow!("'{host}' is not a valid address to listen on: {e}"),
        )
    })?;
    Ok(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr() {
        assert_eq!(
            listen_addr("127.0.0.1", 8080).unwrap().to_string(),
            "127.0.0.1:8080"
        );
        assert_eq!(listen_addr("::1", 80).unwrap().to_string(), "[::1]:80");
        let err = listen_addr("localhost:80", 80).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
