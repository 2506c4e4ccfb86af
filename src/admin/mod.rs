//! Admin API.
//!
//! # Routes
//! ```text
//! GET  /admin/status               version, revision, subscriber count
//! GET  /admin/config               current FinalConfiguration
//! GET  /admin/features             fragments in precedence order
//! PUT  /admin/features/{feature}   submit params, returns the new configuration
//! POST /admin/advisory/{advisor}   run an advisory helper
//! ```
//!
//! Every route requires `Authorization: Bearer <api_key>`.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::AdminConfig;
use crate::store::ConfigStore;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<ConfigStore>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(store: Arc<ConfigStore>, api_key: &str) -> Self {
        Self {
            store,
            api_key: Arc::from(api_key),
        }
    }
}

/// Routes with authentication, without transport layers.
pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/config", get(get_config))
        .route("/admin/features", get(get_features))
        .route("/admin/features/{feature}", put(put_feature))
        .route("/admin/advisory/{advisor}", post(post_advisory))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .with_state(state)
}

pub struct AdminServer {
    router: Router,
}

impl AdminServer {
    #[allow(deprecated)]
    pub fn new(state: AdminState, config: &AdminConfig) -> Self {
        let router = setup_admin_router(state)
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());
        Self { router }
    }

    /// Serve until a shutdown message arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Admin API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Admin API stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::BaseSkeleton;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::AUTHORIZATION, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const KEY: &str = "test-admin-key";

    fn router() -> (Router, Arc<ConfigStore>) {
        let store = Arc::new(ConfigStore::new(BaseSkeleton::default()).unwrap());
        (setup_admin_router(AdminState::new(store.clone(), KEY)), store)
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {KEY}"));
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let (app, _) = router();

        let response = app
            .clone()
            .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::get("/admin/status")
                    .header(AUTHORIZATION, "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_put_feature_updates_store() {
        let (app, store) = router();

        let response = app
            .oneshot(request(
                Method::PUT,
                "/admin/features/hyperPerformance",
                Some(json!({ "tcpFastOpen": true, "muxConcurrency": 8 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[REVISION_HEADER.as_str()], "1");

        let body = json_body(response).await;
        assert_eq!(body["other"]["tcpFastOpen"], json!(true));
        assert_eq!(store.revision(), 1);
    }

    #[tokio::test]
    async fn test_revision_header_names_own_commit() {
        let (app, store) = router();

        // The first commit queues a competing write that lands as soon as
        // the writer lock is released.
        let competing = Arc::new(std::sync::Mutex::new(None));
        let slot = competing.clone();
        let writer = store.clone();
        let _subscription = store.subscribe(move |config: &Arc<crate::FinalConfiguration>| {
            if config.other.get("tcpFastOpen") == Some(&json!(true)) {
                let writer = writer.clone();
                *slot.lock().unwrap() = Some(std::thread::spawn(move || {
                    writer.update_feature(crate::FeatureParams::HyperPerformance(
                        crate::features::HyperPerformanceParams::default(),
                    ))
                }));
            }
        });

        let response = app
            .oneshot(request(
                Method::PUT,
                "/admin/features/hyperPerformance",
                Some(json!({ "tcpFastOpen": true })),
            ))
            .await
            .unwrap();
        let handle = competing.lock().unwrap().take().unwrap();
        handle.join().unwrap().unwrap();

        assert_eq!(store.revision(), 2);
        assert_eq!(response.headers()[REVISION_HEADER.as_str()], "1");
        assert_eq!(json_body(response).await["other"]["tcpFastOpen"], json!(true));
    }

    #[tokio::test]
    async fn test_put_feature_rejections() {
        let (app, store) = router();

        let response = app
            .clone()
            .oneshot(request(Method::PUT, "/admin/features/warpDrive", Some(json!({}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(request(
                Method::PUT,
                "/admin/features/infrastructure",
                Some(json!({ "failover": "often" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("infrastructure"));
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn test_composition_failure_is_unprocessable() {
        let mut skeleton = BaseSkeleton::default();
        skeleton.outbounds[0]
            .settings
            .insert("vnext".into(), json!("not-a-list"));
        let store = Arc::new(ConfigStore::new(skeleton).unwrap());
        let app = setup_admin_router(AdminState::new(store.clone(), KEY));

        let response = app
            .oneshot(request(
                Method::PUT,
                "/admin/features/quantumSafeSupreme",
                Some(json!({ "hybridMode": true })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn test_features_listed_in_precedence_order() {
        let (app, _) = router();

        let response = app
            .oneshot(request(Method::GET, "/admin/features", None))
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let positions: Vec<usize> = [
            "neuralEngine",
            "hyperPerformance",
            "infrastructure",
            "quantumSafeSupreme",
            "stealthProMax",
        ]
        .iter()
        .map(|key| text.find(&format!("\"{key}\"")).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }

    #[tokio::test]
    async fn test_advisory_routes() {
        let (app, _) = router();

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/admin/advisory/network-health",
                Some(json!({ "jitter": 45.0, "latency": 20.0, "packetLoss": 0.0 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await["diagnosis"]
            .as_str()
            .unwrap()
            .starts_with("High jitter"));

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/admin/advisory/server-selection",
                Some(json!({ "userLocation": "Oslo", "candidates": [] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .oneshot(request(Method::POST, "/admin/advisory/tarot", Some(json!({}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
