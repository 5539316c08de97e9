use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Creates the home directory, its subdirectories and:
/// - Creates an initial `config.json` file using `port` and `data_file` along with default settings
/// - Creates `settings.json` with the default budget, keeping any existing one
///
/// # Arguments
/// - `expenses_home` - The directory that will be the root of the home directory, e.g.
///   `$HOME/expenses`
/// - `port` - The port `expenses serve` will listen on.
/// - `data_file` - Where the server stores expenses, relative to `expenses_home` or absolute.
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(
    expenses_home: &Path,
    port: Option<u16>,
    data_file: Option<&Path>,
) -> Result<Out<()>> {
    let config = Config::create(expenses_home, port, data_file.map(PathBuf::from))
        .await
        .context("Unable to create the home directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the expenses directory at {}, expenses will be stored in {}",
        config.root().display(),
        config.data_path().display()
    )
    .into())
}
