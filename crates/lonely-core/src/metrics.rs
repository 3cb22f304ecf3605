//! Prometheus metrics helpers shared by the intake and the feed server.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lonely_core::metrics::{init_metrics, start_metrics_server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let handle = init_metrics()?;
//!     start_metrics_server(9091, handle).await?;
//!
//!     metrics::counter!("intake_events_saved_total").increment(1);
//!     Ok(())
//! }
//! ```
//!
//! # Metric Naming Conventions
//!
//! - Prefix: component (`intake_`, `feed_`)
//! - Suffix: unit or type (`_total` for counters)
//! - Labels: only for small closed sets such as a filter reason

use std::net::SocketAddr;

use axum::{Router, routing::get};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and register metric descriptions.
///
/// Must be called at most once per process, before any metric is recorded.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_common_metrics();
    Ok(handle)
}

/// Like [`init_metrics`] but returns `None` if a recorder is already
/// installed. Useful for tests.
pub fn try_init_metrics() -> Option<PrometheusHandle> {
    init_metrics().ok()
}

/// Serve `/metrics` on `port` from a background task.
///
/// Binds before returning so a port conflict is reported to the caller.
pub async fn start_metrics_server(
    port: u16,
    handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on http://{}/metrics", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "metrics server stopped");
        }
    });

    Ok(())
}

fn register_common_metrics() {
    // =========================================================================
    // Intake
    // =========================================================================

    describe_counter!(
        "intake_events_read_total",
        "Messages read from the Jetstream connection"
    );
    describe_counter!(
        "intake_events_saved_total",
        "Standard posts saved to the store"
    );
    describe_counter!(
        "intake_events_deleted_total",
        "Posts removed from the store after an interaction"
    );
    describe_counter!(
        "intake_events_filtered_total",
        "Standard posts rejected by the content filter (label: reason)"
    );
    describe_counter!(
        "intake_events_ignored_total",
        "Events that were not eligible for processing"
    );
    describe_counter!("intake_errors_total", "Store errors raised by workers");
    describe_counter!(
        "intake_parse_errors_total",
        "Messages that could not be decoded as events"
    );
    describe_gauge!("intake_queue_depth", "Events waiting in the work queue");
    describe_gauge!(
        "intake_running",
        "Whether the intake is currently running (1=yes, 0=no)"
    );

    // =========================================================================
    // Feed
    // =========================================================================

    describe_counter!("feed_requests_total", "Feed skeleton requests served");
    describe_counter!(
        "feed_posts_served_total",
        "Posts returned across all feed skeleton responses"
    );
}

/// Increment a counter.
#[inline]
pub fn increment(name: &'static str, count: u64) {
    metrics::counter!(name).increment(count);
}

/// Set a gauge value.
#[inline]
pub fn set_gauge(name: &'static str, value: f64) {
    metrics::gauge!(name).set(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn ensure_metrics_init() {
        INIT.call_once(|| {
            let _ = try_init_metrics();
        });
    }

    #[test]
    fn try_init_metrics_only_installs_once() {
        let first = try_init_metrics();
        let second = try_init_metrics();
        assert!(first.is_none() || second.is_none());
    }

    #[test]
    fn helpers_do_not_panic() {
        ensure_metrics_init();
        increment("intake_events_saved_total", 0);
        increment("intake_events_saved_total", 3);
        set_gauge("intake_queue_depth", 0.0);
        set_gauge("intake_queue_depth", 128.0);
    }

    #[test]
    fn registering_descriptions_twice_is_fine() {
        ensure_metrics_init();
        register_common_metrics();
        register_common_metrics();
    }
}
