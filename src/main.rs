//! Admin Client CLI
//!
//! Fetches dashboard endpoints through the cached API client and prints the
//! JSON responses.
//!
//! ```text
//! admin-client [--refresh] [--clear] <endpoint>...
//! ```

use std::env;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admin_client::{ApiClient, Config, HttpTransport, RequestOptions};

const USAGE: &str = "usage: admin-client [--refresh] [--clear] <endpoint>...";

/// Main entry point for the admin client.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the client, pre-populating the cache from durable storage
/// 4. Start the background expiry sweep
/// 5. Fetch each endpoint, stopping early on Ctrl+C/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admin_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut force_refresh = false;
    let mut clear = false;
    let mut endpoints = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--refresh" => force_refresh = true,
            "--clear" => clear = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => endpoints.push(arg),
        }
    }

    let config = Config::from_env();
    info!(
        "Configuration loaded: base_url={}, max_entries={}, default_ttl={}ms, storage={}",
        config.base_url,
        config.max_entries,
        config.default_ttl.as_millis(),
        config.storage_path.display()
    );

    let mut client = ApiClient::from_config(&config).context("Failed to build API client")?;
    client.start_expiry_cleanup(config.cleanup_interval);

    if clear {
        let removed = client.invalidate_cache(None).await;
        info!("Cleared {} cached responses", removed);
    }

    if endpoints.is_empty() && !clear {
        eprintln!("{USAGE}");
    }

    let mut options = RequestOptions::get();
    if force_refresh {
        options = options.with_force_refresh();
    }

    tokio::select! {
        result = fetch_all(&client, &endpoints, &options) => result?,
        _ = shutdown_signal() => {
            warn!("Interrupted, stopping");
        }
    }

    let stats = client.cache_stats().await;
    info!(
        "Cache: {} entries, {} hits, {} misses, hit rate {:.0}%",
        stats.total_entries,
        stats.hits,
        stats.misses,
        stats.hit_rate() * 100.0
    );

    Ok(())
}

async fn fetch_all(
    client: &ApiClient<HttpTransport>,
    endpoints: &[String],
    options: &RequestOptions,
) -> anyhow::Result<()> {
    for endpoint in endpoints {
        let response = client
            .request(endpoint, options)
            .await
            .with_context(|| format!("Request to {endpoint} failed"))?;
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}
