use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{server, Config, Result};
use std::net::SocketAddr;
use tracing::info;

/// Runs the HTTP API until interrupted with Ctrl-C.
///
/// `listen` overrides the address stored in `config.json`.
pub async fn serve(config: Config, listen: Option<SocketAddr>) -> Result<Out<()>> {
    let addr = match listen {
        Some(addr) => addr,
        None => config.listen_addr().pub_result(ErrorType::Config)?,
    };
    info!(
        "Serving expenses from '{}' on http://{addr}",
        config.sqlite_path().display()
    );
    server::run(config.db().clone(), addr)
        .await
        .pub_result(ErrorType::Service)?;
    Ok("Server stopped".into())
}
