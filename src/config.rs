//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json` and contains the settings of
//! the expense server: the port it listens on and where the expense data file lives. Client-side
//! budget settings are kept separately, see `Settings`.

use crate::error::{ErrorType, IntoResult};
use crate::settings::Settings;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
pub const DEFAULT_PORT: u16 = 8080;
const CONFIG_JSON: &str = "config.json";
const SETTINGS_JSON: &str = "settings.json";
const DATA: &str = "data";
const EXPENSES_JSON: &str = "expenses.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`. It provides
/// paths to the other files, which are either configurable or expected in a certain location
/// within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    data_path: PathBuf,
    settings_path: PathBuf,
}

impl Config {
    /// Creates the home directory and:
    /// - Creates an initial `config.json` file using `port` and `data_file`
    /// - Creates `settings.json` with the default budget, unless one already exists
    /// - Creates the directory that will hold the expense data file
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/expenses`
    /// - `port` - The port the server listens on. Defaults to 8080.
    /// - `data_file` - Where to store expenses, relative to `dir` or absolute. Defaults to
    ///   `data/expenses.json`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        port: Option<u16>,
        data_file: Option<PathBuf>,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), port, data_file)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(
        maybe_relative: PathBuf,
        port: Option<u16>,
        data_file: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            port: port.unwrap_or(DEFAULT_PORT),
            data_file,
        };
        config_file.save(&config_path).await?;

        let config = Self::from_parts(root, config_path, config_file);
        if let Some(parent) = config.data_path.parent() {
            utils::make_dir(parent).await?;
        }
        if !config.settings_path.is_file() {
            Settings::default()
                .save(&config.settings_path)
                .await
                .context("Unable to create the settings file")?;
        }
        Ok(config)
    }

    /// This will
    /// - validate that `expenses_home` exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(expenses_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(expenses_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> anyhow::Result<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expenses home directory is missing, run 'expenses init'")?;
        if !root.is_dir() {
            bail!("The expenses home '{}' is not a directory", root.display())
        }

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'expenses init'",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Ok(Self::from_parts(root, config_path, config_file))
    }

    fn from_parts(root: PathBuf, config_path: PathBuf, config_file: ConfigFile) -> Self {
        let data_path = match &config_file.data_file {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(DATA).join(EXPENSES_JSON),
        };
        Self {
            settings_path: root.join(SETTINGS_JSON),
            root,
            config_path,
            config_file,
            data_path,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The JSON file that holds the expense records.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// The client-local budget settings file.
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn port(&self) -> u16 {
        self.config_file.port
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "port": 8080,
///   "data_file": "data/expenses.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The port the HTTP server listens on
    #[serde(default = "default_port")]
    port: u16,

    /// Path to the expense data file (optional, relative to the home directory or absolute)
    /// Defaults to $EXPENSES_HOME/data/expenses.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_file: Option<PathBuf>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[cfg(test)]
impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            port: DEFAULT_PORT,
            data_file: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
