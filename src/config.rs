//! Configuration file handling for account-book.
//!
//! The configuration file is stored at `$ACCOUNT_BOOK_HOME/config.json` next to the SQLite
//! database that holds the expenses.

use crate::db::Db;
use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "account-book";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPENSES_SQLITE: &str = "expenses.sqlite";

/// The address the server listens on when nothing else is configured.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$ACCOUNT_BOOK_HOME` and from there it loads `config.json` and opens the database.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory along with:
    /// - an initial `config.json` holding `listen_addr`
    /// - a new SQLite database with the current schema
    ///
    /// # Errors
    /// - Returns an error if the directory already holds a config file or database.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, listen_addr: SocketAddr) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            listen_addr: listen_addr.to_string(),
        };

        let sqlite_path = root.join(EXPENSES_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - open the database, migrating it if needed
    pub async fn load(home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The home directory is missing, run 'account-book init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(EXPENSES_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    /// The configured server address.
    pub fn listen_addr(&self) -> Res<SocketAddr> {
        self.config_file.listen_addr.parse().with_context(|| {
            format!(
                "Invalid listen_addr '{}' in '{}'",
                self.config_file.listen_addr,
                self.config_path.display()
            )
        })
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "account-book",
///   "config_version": 1,
///   "listen_addr": "127.0.0.1:8787"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "account-book"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The socket address `account-book serve` binds to.
    #[serde(default = "default_listen_addr")]
    listen_addr: String,
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

impl ConfigFile {
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn addr() -> SocketAddr {
        DEFAULT_LISTEN_ADDR.parse().unwrap()
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("account-book");

        let created = Config::create(&home, "0.0.0.0:9000".parse().unwrap())
            .await
            .unwrap();
        assert!(created.config_path().is_file());
        assert!(created.sqlite_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.root(), created.root());
        assert_eq!(
            loaded.listen_addr().unwrap(),
            "0.0.0.0:9000".parse::<SocketAddr>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), addr()).await.unwrap();
        let err = Config::create(dir.path(), addr()).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("config file is missing"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let original = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            listen_addr: "127.0.0.1:1234".to_string(),
        };
        original.save(&path).await.unwrap();
        assert_eq!(ConfigFile::load(&path).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_config_file_listen_addr_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(&path, r#"{"app_name": "account-book", "config_version": 1}"#)
            .await
            .unwrap();
        let config = ConfigFile::load(&path).await.unwrap();
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
    }

    #[tokio::test]
    async fn test_config_file_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(
            &path,
            r#"{"app_name": "ledger", "config_version": 1, "listen_addr": "127.0.0.1:1"}"#,
        )
        .await
        .unwrap();
        let err = ConfigFile::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_invalid_listen_addr() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), addr()).await.unwrap();
        utils::write(
            config.config_path(),
            r#"{"app_name": "account-book", "config_version": 1, "listen_addr": "nowhere"}"#,
        )
        .await
        .unwrap();
        let reloaded = Config::load(dir.path()).await.unwrap();
        assert!(reloaded.listen_addr().is_err());
    }
}
