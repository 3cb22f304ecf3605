//! Lonely posts intake daemon.
//!
//! Connects to Jetstream, keeps the post store current and exits when the
//! stream closes, too many malformed messages arrive, or a shutdown signal
//! is received.
//!
//! # Usage
//!
//! ```bash
//! # Local Valkey, public Jetstream
//! lonely-ingest
//!
//! # Managed Valkey over TLS, four workers, metrics on :9090
//! VALKEY_ADDRESS=cache.internal:6380 VALKEY_TLS_ENABLED=true \
//!     lonely-ingest --workers 4 --metrics-port 9090
//! ```
//!
//! # Graceful Shutdown
//!
//! SIGINT (Ctrl+C) and SIGTERM:
//! 1. Stop reading from Jetstream (within one second)
//! 2. Save the last seen `time_us` as the stream cursor
//! 3. Signal workers and wait for them
//!
//! A restart within the cursor TTL resumes a few seconds before that point.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use lonely_core::metrics::{init_metrics, start_metrics_server};
use lonely_core::{ContentFilter, FilterSets, Store, StoreSettings, ValkeyBackend, ValkeyConfig};
use lonely_ingest::{DEFAULT_JETSTREAM_URL, Intake, IntakeConfig, JetstreamConfig};
use tracing_subscriber::EnvFilter;

/// Lonely posts intake daemon.
#[derive(Parser, Debug)]
#[command(name = "lonely-ingest")]
#[command(about = "Jetstream intake for the lonely posts feed")]
#[command(version)]
struct Args {
    /// Valkey server address (host:port)
    #[arg(long, env = "VALKEY_ADDRESS", default_value = "127.0.0.1:6379")]
    valkey_address: String,

    /// Connect to Valkey over TLS
    #[arg(long, env = "VALKEY_TLS_ENABLED")]
    valkey_tls: bool,

    /// Jetstream subscribe endpoint
    #[arg(long, env = "JETSTREAM_URL", default_value = DEFAULT_JETSTREAM_URL)]
    jetstream_url: String,

    /// Number of worker tasks
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Capacity of the queue between reader and workers
    #[arg(long, default_value = "10000")]
    queue_size: usize,

    /// Malformed messages tolerated before shutting down
    #[arg(long, default_value = "10")]
    error_threshold: usize,

    /// Metrics HTTP server port (0 to disable)
    #[arg(long, default_value = "0")]
    metrics_port: u16,

    /// Ignore any persisted cursor and start from the live stream
    #[arg(long)]
    no_resume: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required when both ring and aws-lc-rs are present)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("failed to install rustls crypto provider");
    }

    init_tracing()?;

    let args = Args::parse();

    tracing::info!("Lonely posts intake starting...");

    if args.metrics_port > 0 {
        let metrics_handle = init_metrics().context("Failed to install metrics recorder")?;
        start_metrics_server(args.metrics_port, metrics_handle)
            .await
            .context("Failed to start metrics server")?;
    }

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received, stopping gracefully...");
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let valkey = ValkeyConfig {
        address: args.valkey_address.clone(),
        tls: args.valkey_tls,
        ..Default::default()
    };
    let backend = ValkeyBackend::new(&valkey).context("Failed to create Valkey pool")?;
    let store = Store::connect(Arc::new(backend), StoreSettings::default())
        .await
        .context("Failed to reach Valkey")?;

    let config = IntakeConfig {
        workers: args.workers,
        queue_size: args.queue_size,
        error_threshold: args.error_threshold,
        ..Default::default()
    };
    let jetstream = JetstreamConfig {
        url: args.jetstream_url.clone(),
        ..Default::default()
    };

    tracing::info!("Configuration:");
    tracing::info!("  Valkey: {} (tls: {})", valkey.address, valkey.tls);
    tracing::info!("  Jetstream: {}", jetstream.url);
    tracing::info!("  Workers: {}", config.workers);
    tracing::info!("  Queue size: {}", config.queue_size);
    tracing::info!("  Error threshold: {}", config.error_threshold);

    let intake = Intake::new(config, store, ContentFilter::new(FilterSets::builtin()))
        .with_running_flag(Arc::clone(&running));

    let cursor = if args.no_resume {
        tracing::info!("Resume disabled, starting from the live stream");
        None
    } else {
        intake.resume_cursor().await
    };

    let stream = jetstream
        .connect(cursor)
        .await
        .context("Failed to connect to Jetstream")?;

    let summary = intake.run(stream).await.context("Intake failed")?;

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("SHUTDOWN COMPLETE");
    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("Stop reason:       {}", summary.stop_reason);
    tracing::info!("Events read:       {}", summary.events_read);
    tracing::info!("Parse errors:      {}", summary.parse_errors);
    tracing::info!("Posts saved:       {}", summary.processed.saves);
    tracing::info!("Posts deleted:     {}", summary.processed.deletions);
    tracing::info!("Posts filtered:    {}", summary.processed.filtered);
    tracing::info!("Events ignored:    {}", summary.processed.ignored);
    tracing::info!("Store errors:      {}", summary.processed.errors);
    match summary.last_cursor {
        Some(cursor) if summary.cursor_saved => tracing::info!("Cursor saved:      {}", cursor),
        Some(cursor) => tracing::warn!("Cursor NOT saved:  {}", cursor),
        None => tracing::info!("Cursor:            none"),
    }

    Ok(())
}

/// `info` by default, this crate at `debug` when `DEBUG=true`. `RUST_LOG`
/// directives are applied on top.
fn init_tracing() -> Result<()> {
    let mut filter = EnvFilter::from_default_env().add_directive("info".parse()?);
    if std::env::var("DEBUG").is_ok_and(|v| v == "true") {
        filter = filter
            .add_directive("lonely_ingest=debug".parse()?)
            .add_directive("lonely_core=debug".parse()?);
    }

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
