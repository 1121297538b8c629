//! The `stylize serve` command: run the HTTP server.

use clap::Args;
use std::sync::Arc;
use stylize_core::{Config, Stylizer};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if config.server.port == 0 {
        anyhow::bail!("Port must be greater than 0");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let stylizer = Stylizer::from_config(config)?;
    tracing::info!(
        "Vision model: {}, generator: {}",
        stylizer.vision_model(),
        stylizer.config().generation.fal.model
    );

    let app = crate::server::router(Arc::new(stylizer));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Stylize listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
