//! HTTP server command handler.

use anyhow::Result;

#[cfg(feature = "server")]
use super::common::load_config;
use super::GlobalArgs;

/// Start the HTTP server.
#[cfg(feature = "server")]
pub(crate) async fn cmd_serve(
    globals: &GlobalArgs,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = load_config(globals)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    finsight::server::serve(&config).await?;
    Ok(())
}

#[cfg(not(feature = "server"))]
pub(crate) async fn cmd_serve(
    _globals: &GlobalArgs,
    _host: Option<String>,
    _port: Option<u16>,
) -> Result<()> {
    anyhow::bail!(
        "The HTTP server requires the 'server' build feature. \
         Rebuild with: cargo build --features server"
    )
}
