//! Proxy configuration composer daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   features.json ──watch──▶ ParamsWatcher ──mpsc──┐
//!                                                 ▼
//!   admin API ──PUT /admin/features/{id}──▶ ┌──────────────┐
//!                                           │ ConfigStore  │──▶ subscribers
//!   skeleton.json ──bootstrap──────────────▶│  producers   │      └─▶ config.json
//!                                           │  composer    │
//!                                           └──────────────┘
//!
//!   SIGHUP ──▶ re-read features.json      SIGTERM/SIGINT ──▶ Shutdown
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use proxy_composer::admin::{AdminServer, AdminState};
use proxy_composer::config::loader::{load_config, load_feature_params};
use proxy_composer::config::watcher::ParamsWatcher;
use proxy_composer::config::ComposerConfig;
use proxy_composer::lifecycle::{apply_params, bootstrap, next_signal, Shutdown, Signal};
use proxy_composer::observability::{logging, metrics};
use proxy_composer::ConfigStore;

#[derive(Parser)]
#[command(name = "proxy-composer")]
#[command(about = "Composes proxy configurations from feature modules", long_about = None)]
struct Args {
    /// Path to the TOML settings file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ComposerConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "proxy-composer starting");

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let store = bootstrap(&config)?;
    tracing::info!(
        revision = store.revision(),
        subscribers = store.subscriber_count(),
        "Store ready"
    );

    let shutdown = Shutdown::new();

    // Dropping the notify handle stops the watch, so it lives until exit.
    let _watcher = match (&config.features.params_path, config.features.watch) {
        (Some(path), true) => {
            let (watcher, mut updates) = ParamsWatcher::new(
                Path::new(path),
                Duration::from_secs(config.features.poll_interval_secs),
            );
            let handle = watcher.run()?;

            let store = store.clone();
            let mut stop = shutdown.subscribe();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        Some(params) = updates.recv() => apply_in_background(&store, params).await,
                        _ = stop.recv() => break,
                        else => break,
                    }
                }
            });
            Some(handle)
        }
        _ => None,
    };

    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let server = AdminServer::new(
            AdminState::new(store.clone(), &config.admin.api_key),
            &config.admin,
        );
        Some(tokio::spawn(server.run(listener, shutdown.subscribe())))
    } else {
        None
    };

    loop {
        match next_signal().await? {
            Signal::Reload => reload(&config, &store).await,
            Signal::Shutdown => break,
        }
    }

    let notified = shutdown.trigger();
    tracing::info!(tasks = notified, "Shutting down");

    if let Some(task) = admin_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API exited with error"),
            Err(e) => tracing::error!(error = %e, "Admin API task panicked"),
        }
    }

    tracing::info!(revision = store.revision(), "Shutdown complete");
    Ok(())
}

/// Subscribers write files, so updates run off the async workers.
async fn apply_in_background(store: &Arc<ConfigStore>, params: Vec<proxy_composer::FeatureParams>) {
    let store = store.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || apply_params(&store, params)).await {
        tracing::error!(error = %e, "Feature params task failed");
    }
}

async fn reload(config: &ComposerConfig, store: &Arc<ConfigStore>) {
    let Some(path) = &config.features.params_path else {
        tracing::info!("No feature params file configured, nothing to reload");
        return;
    };
    match load_feature_params(Path::new(path)) {
        Ok(params) => apply_in_background(store, params).await,
        Err(e) => tracing::error!(
            error = %e,
            "Failed to reload feature params, keeping current fragments"
        ),
    }
}
