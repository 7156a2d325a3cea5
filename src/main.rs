use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use discord_token_relay::{app, mask_secret, AppState, Config};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let discord = &config.discord;
    if discord.has_credentials() {
        tracing::info!(
            client_id = %discord.client_id,
            client_secret = %mask_secret(&discord.client_secret),
            redirect_uri = discord.redirect_uri.as_deref().unwrap_or("<none>"),
            "Discord client configured"
        );
    } else {
        tracing::warn!(
            "DISCORD_CLIENT_ID or DISCORD_CLIENT_SECRET is not set, token exchange will fail until configured"
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!(
        "Discord token relay listening on {}",
        listener.local_addr()?
    );

    let state = Arc::new(AppState::new(config));
    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    tracing::info!("Discord token relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
