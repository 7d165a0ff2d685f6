mod config;
mod greeting;
mod routes;
mod state;
mod talk;
mod ws;

use std::net::SocketAddr;

use tokio::net::TcpListener;

use config::{generate_config_template, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "myjlab_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "myjlab_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("myjlab server v{} starting", env!("CARGO_PKG_VERSION"));

    if config.talk_api_key.is_empty() {
        tracing::warn!("No talk API key configured; POST /talk will be rejected upstream");
    }

    // Build application state
    let app_state = state::AppState::new(config.talk_api_url.clone(), config.talk_api_key.clone());

    // Build router
    let app = routes::build_router(app_state);

    // Bind and serve. ConnectInfo is required so the chat handshake can
    // derive identities from the remote address.
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
