//! # plughubd — plughub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load and validate configuration (TOML file, env vars) before touching
//!   any device
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct one reconciler per configured strip (Kasa client + durable
//!   tracker/audit stores)
//! - Run the periodic reconciliation loop
//! - Build the axum router and serve until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::collections::HashMap;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use plughub_adapter_http_axum::state::AppState;
use plughub_adapter_kasa::KasaStrip;
use plughub_adapter_storage_sqlite_sqlx::{SqliteAuditLog, SqliteTrackerStore};
use plughub_app::reconciler::Reconciler;
use plughub_domain::time::now;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration fails fast, before any strip is contacted.
    let config = Config::load()?;
    let devices = config.validated_devices(now())?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = plughub_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();
    let audit = SqliteAuditLog::new(pool.clone());

    // One reconciler per strip
    let mut reconcilers = HashMap::new();
    for device in devices {
        for outlet in &device.outlets {
            tracing::info!(
                device = %device.name,
                outlet = %outlet.name,
                default = %outlet.default,
                schedule = outlet.schedule.kind(),
                "outlet configured"
            );
        }
        let strip =
            KasaStrip::new(&device.name, &device.host).with_timeout(config.command_timeout());
        let name = device.name.clone();
        let reconciler = Reconciler::new(
            device,
            strip,
            SqliteTrackerStore::new(pool.clone()),
            SqliteAuditLog::new(pool.clone()),
        );
        reconcilers.insert(name, reconciler);
    }
    let reconcilers = Arc::new(reconcilers);

    // Periodic reconciliation loop
    let pass_reconcilers = Arc::clone(&reconcilers);
    let interval = config.reconcile_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let at = now();
            for (name, reconciler) in pass_reconcilers.iter() {
                match reconciler.reconcile(at).await {
                    Ok(reports) => {
                        tracing::debug!(
                            device = %name,
                            outlets = reports.len(),
                            "reconciliation pass complete"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(device = %name, error = %err, "reconciliation pass failed");
                    }
                }
            }
        }
    });

    // HTTP
    let state = AppState::from_arcs(reconcilers, Arc::new(audit));
    let app = plughub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "plughubd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
