//! Lonely posts feed generator server.
//!
//! Connects to the post store and serves the feed skeleton and DID document.

use std::sync::Arc;

use anyhow::Context;
use axum::http::Request;
use clap::Parser;
use lonely_core::metrics::{init_metrics, start_metrics_server};
use lonely_core::{Store, StoreSettings, ValkeyBackend};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use lonely_serve::{AppState, Config, router};

/// Lonely posts feed generator server.
#[derive(Parser, Debug)]
#[command(name = "lonely-serve")]
#[command(about = "Feed generator API for the lonely posts feed", long_about = None)]
struct Args {
    /// Path to .env file (optional).
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if std::path::Path::new(&args.dotenv).exists() {
        dotenvy::from_path(&args.dotenv)?;
        eprintln!("Loaded environment from {}", args.dotenv);
    }

    // Install rustls crypto provider for TLS connections to the store
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("failed to install rustls crypto provider");
    }

    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if std::env::var("DEBUG").is_ok_and(|v| v == "true") {
        filter = filter
            .add_directive("lonely_serve=debug".parse()?)
            .add_directive("lonely_core=debug".parse()?);
    }
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();

    if config.metrics_port > 0 {
        let handle = init_metrics().context("Failed to install metrics recorder")?;
        start_metrics_server(config.metrics_port, handle)
            .await
            .context("Failed to start metrics server")?;
    }

    let backend = ValkeyBackend::new(&config.valkey).context("Failed to create Valkey pool")?;
    let store = Store::connect(Arc::new(backend), StoreSettings::default())
        .await
        .context("Failed to reach Valkey")?;

    let state = AppState::new(store, config);

    let app = router(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    query = request.uri().query().unwrap_or("")
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "starting server");

    axum::serve(listener, app).await?;

    Ok(())
}
