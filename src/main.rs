//! Coach Cache demo daemon
//!
//! Runs the cache registry the way the coaching backend does: a handful of
//! named caches fronting slow lookups, with statistics logged periodically.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coach_cache::{CacheConfig, CacheRegistry, EvictionPolicy, RegistryConfig};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load registry configuration from environment variables
/// 3. Create the application caches
/// 4. Run a read-through workload until SIGINT/SIGTERM
/// 5. Destroy the registry, flushing persistent caches
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coach_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coach Cache demo");

    let config = RegistryConfig::from_env();
    info!(
        "Configuration loaded: persist_dir={:?}, compute_timeout={}ms, max_sweep_interval={}ms",
        config.persist_dir, config.compute_timeout_ms, config.max_sweep_interval_ms
    );

    let registry: Arc<CacheRegistry<Value>> = Arc::new(
        CacheRegistry::from_config(&config).context("failed to initialize cache registry")?,
    );
    create_caches(&registry, config.persist_dir.is_some()).await;

    let workload = tokio::spawn(run_workload(registry.clone()));

    shutdown_signal().await;

    workload.abort();
    registry.destroy().await;
    info!("Shutdown complete");
    Ok(())
}

async fn create_caches(registry: &CacheRegistry<Value>, persistent: bool) {
    registry
        .create_cache(
            "exercises",
            CacheConfig::new()
                .with_ttl(Duration::from_secs(30 * 60))
                .with_max_entries(500)
                .with_policy(EvictionPolicy::Lfu)
                .with_persistence(persistent),
        )
        .await;

    registry
        .create_cache(
            "dashboard",
            CacheConfig::new()
                .with_ttl(Duration::from_secs(60))
                .with_max_entries(50)
                .with_compression(true),
        )
        .await;

    registry
        .create_cache(
            "api",
            CacheConfig::new()
                .with_ttl(Duration::from_secs(10))
                .with_max_entries(20)
                .with_policy(EvictionPolicy::Fifo)
                .with_validator(|value: &Value| !value.is_null()),
        )
        .await;
}

/// Simulated request loop: read-through lookups against the caches.
async fn run_workload(registry: Arc<CacheRegistry<Value>>) {
    let mut tick: u64 = 0;
    let mut report = tokio::time::interval(Duration::from_secs(5));

    loop {
        tokio::select! {
            _ = report.tick() => {
                let stats = registry.get_all_stats().await;
                match serde_json::to_string(&stats) {
                    Ok(json) => info!(stats = %json, "Cache statistics"),
                    Err(e) => warn!(error = %e, "Failed to encode statistics"),
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(100)) => {
                tick += 1;
                let exercise_id = tick % 40;
                let client_id = tick % 7;

                let exercise = registry
                    .get_or_set(
                        "exercises",
                        &format!("exercise:{}", exercise_id),
                        || load_exercise(exercise_id),
                        None,
                    )
                    .await;
                if let Err(e) = exercise {
                    warn!(error = %e, "Exercise lookup failed");
                }

                let dashboard = registry
                    .get_or_set(
                        "dashboard",
                        &format!("client:{}:summary", client_id),
                        || render_dashboard(client_id),
                        None,
                    )
                    .await;
                if let Err(e) = dashboard {
                    warn!(error = %e, "Dashboard render failed");
                }

                if tick % 50 == 0 {
                    let removed = registry
                        .invalidate_prefix("dashboard", &format!("client:{}:", client_id))
                        .await;
                    info!(client_id, removed, "Invalidated client dashboard");
                }
            }
        }
    }
}

/// Stand-in for a database read.
async fn load_exercise(id: u64) -> anyhow::Result<Value> {
    tokio::time::sleep(Duration::from_millis(20)).await;
    let muscle_group = ["legs", "back", "chest", "arms"][(id % 4) as usize];
    Ok(json!({
        "id": id,
        "name": format!("Exercise {}", id),
        "muscle_group": muscle_group,
        "default_sets": 3 + id % 3,
    }))
}

/// Stand-in for an expensive page fragment render.
async fn render_dashboard(client_id: u64) -> anyhow::Result<Value> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    let rows: String = (0..20)
        .map(|week| format!("<tr><td>week {}</td><td>client {}</td></tr>", week, client_id))
        .collect();
    Ok(Value::String(format!("<table>{}</table>", rows)))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
}
