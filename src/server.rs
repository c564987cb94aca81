use crate::config::Config;
use crate::core_network::network;
use anyhow::{Context, Result};
use log::info;

/// Runs the server with the provided configuration: resolve the served
/// directory, bind the control listener, and hand off to the accept loop.
pub async fn run(config: Config) -> Result<()> {
    let root = config
        .server
        .root_dir
        .canonicalize()
        .with_context(|| format!("Invalid root directory: {:?}", config.server.root_dir))?;

    let listener = network::bind(config.server.listen_port)
        .await
        .with_context(|| format!("Unable to bind port {}", config.server.listen_port))?;

    info!(
        "Server accepting connections on port {}.",
        config.server.listen_port
    );
    info!("Serving directory {:?}", root);
    info!("Exit the server with CTRL+C");

    network::start_server(listener, root).await?;
    info!("Server shut down normally.");
    Ok(())
}
