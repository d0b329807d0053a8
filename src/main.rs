//! Token Cache - demo service
//!
//! Serves the token cache over HTTP: decode and verify endpoints that reuse
//! cached tokens, plus stats and a forced cleanup.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_cache::api::create_router;
use token_cache::token::VerificationKey;
use token_cache::{AppState, Config, TokenCache};

/// Main entry point for the token cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the token cache worker
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM, cancel the cache and wait for its worker
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting token cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: ttl={:?}, leeway={:?}, sweep_interval={:?}, max_entries={}, port={}",
        config.cache.ttl,
        config.cache.leeway,
        config.cache.sweep_interval,
        config.cache.max_entries,
        config.server_port
    );

    let cancel = CancellationToken::new();
    let (cache, worker) = TokenCache::start(config.cache.clone(), cancel.clone());

    let key = config
        .jwt_secret
        .as_deref()
        .map(|secret| VerificationKey::hmac(secret.as_bytes()));
    if key.is_none() {
        warn!("JWT_SECRET not set, /token/verify is disabled");
    }

    let app = create_router(AppState::new(cache, key));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await
        .context("server error")?;

    worker.await.context("token cache worker panicked")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then cancels the cache.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cancel.cancel();
    warn!("Token cache cancelled");
}
