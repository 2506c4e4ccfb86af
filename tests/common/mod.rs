//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use tokio::net::TcpListener;

use proxy_composer::admin::{AdminServer, AdminState};
use proxy_composer::config::AdminConfig;
use proxy_composer::lifecycle::Shutdown;
use proxy_composer::{BaseSkeleton, ConfigStore, FeatureParams};

#[allow(dead_code)]
pub const API_KEY: &str = "integration-test-key";

/// Build params from the externally tagged wire form, e.g.
/// `{ "stealthProMax": { "obfuscationLevel": "high" } }`.
pub fn params(value: Value) -> FeatureParams {
    serde_json::from_value(value).expect("valid feature params")
}

pub fn default_store() -> Arc<ConfigStore> {
    Arc::new(ConfigStore::new(BaseSkeleton::default()).expect("default skeleton composes"))
}

/// Start the admin API on an ephemeral port.
#[allow(dead_code)]
pub async fn start_admin(store: Arc<ConfigStore>, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = AdminServer::new(AdminState::new(store, API_KEY), &AdminConfig::default());
    let stop = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, stop).await;
    });

    addr
}
