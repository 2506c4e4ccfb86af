//! Admin API driven through the SDK against a live listener.

use composer_sdk::ComposerClient;
use reqwest::StatusCode;
use serde_json::json;

use proxy_composer::lifecycle::Shutdown;

mod common;
use common::{default_store, params, start_admin, API_KEY};

#[tokio::test]
async fn test_status_and_config() {
    let store = default_store();
    store
        .update_feature(params(json!({ "infrastructure": { "failover": true } })))
        .unwrap();

    let shutdown = Shutdown::new();
    let addr = start_admin(store.clone(), &shutdown).await;
    let client = ComposerClient::new(&format!("http://{addr}"), API_KEY);

    let status = client.status().await.unwrap();
    assert_eq!(status.status, "operational");
    assert_eq!(status.revision, 1);

    let config = client.config().await.unwrap();
    assert_eq!(config, serde_json::to_value(&*store.final_configuration()).unwrap());

    shutdown.trigger();
}

#[tokio::test]
async fn test_update_round_trip() {
    let store = default_store();
    let shutdown = Shutdown::new();
    let addr = start_admin(store.clone(), &shutdown).await;
    let client = ComposerClient::new(&format!("http://{addr}"), API_KEY);

    let update = client
        .update_feature("stealthProMax", &json!({ "obfuscationLevel": "high", "serverName": "cdn.example" }))
        .await
        .unwrap();
    assert_eq!(update.revision, Some(1));
    assert_eq!(update.configuration["other"]["serverName"], json!("cdn.example"));

    let features = client.features().await.unwrap();
    assert_eq!(features["stealthProMax"]["routingStrategy"], json!("stealth"));
    assert_eq!(features["neuralEngine"], json!({}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_errors_surface_status_and_message() {
    let store = default_store();
    let shutdown = Shutdown::new();
    let addr = start_admin(store, &shutdown).await;

    let intruder = ComposerClient::new(&format!("http://{addr}"), "guess");
    let err = intruder.status().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    let client = ComposerClient::new(&format!("http://{addr}"), API_KEY);
    let err = client
        .update_feature("teleportation", &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert!(err.to_string().contains("teleportation"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_advisory_over_http() {
    let shutdown = Shutdown::new();
    let addr = start_admin(default_store(), &shutdown).await;
    let client = ComposerClient::new(&format!("http://{addr}"), API_KEY);

    let route = client
        .advise(
            "relay-chain",
            &json!({
                "userLocation": "Lisbon, Portugal",
                "availableServers": [
                    { "name": "pt-lis", "region": "Portugal", "latencyMs": 15 },
                    { "name": "nl-ams", "region": "Netherlands", "latencyMs": 40 }
                ],
                "maxHops": 2
            }),
        )
        .await
        .unwrap();
    assert_eq!(route["optimizedRoute"], json!(["pt-lis", "nl-ams"]));

    let err = client
        .advise("network-health", &json!({ "jitter": -3.0, "latency": 10.0, "packetLoss": 0.0 }))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));

    shutdown.trigger();
}
