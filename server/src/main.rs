use std::path::PathBuf;

use laudo_server::backend::{create_router, initialize_backend};
use laudo_server::config::LaudoConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // An explicit path on the command line wins over LAUDO_CONFIG
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = LaudoConfig::load(config_path.as_deref())?;

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config.server);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
