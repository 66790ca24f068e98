use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::net::SocketAddr;
use std::path::Path;

/// Creates the home directory along with:
/// - an initial `config.json` holding `listen_addr` and default settings
/// - an empty SQLite expenses database
///
/// # Arguments
/// - `home` - The directory that will hold the config and database, e.g. `$HOME/account-book`
/// - `listen_addr` - The address that `account-book serve` will listen on by default.
///
/// # Errors
/// - Returns an error if the directory has already been initialized.
/// - Returns an error if any file operations fail.
pub async fn init(home: &Path, listen_addr: SocketAddr) -> Result<Out<()>> {
    let config = Config::create(home, listen_addr)
        .await
        .context("Unable to create the home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the account-book directory at '{}'",
        config.root().display()
    )
    .into())
}
