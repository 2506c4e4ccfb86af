use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::admin::AdminState;
use crate::advisory::{AdvisorKind, AdvisoryError};
use crate::features::{FeatureId, FeatureParams, Fragment};
use crate::skeleton::FinalConfiguration;
use crate::store::StoreError;

/// Carries the store revision on update responses.
pub const REVISION_HEADER: HeaderName = HeaderName::from_static("x-config-revision");

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AdminError {
    fn status(&self) -> StatusCode {
        match self {
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for AdminError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Compose { .. } => AdminError::Unprocessable(e.to_string()),
            StoreError::Reentrant { .. } => AdminError::Internal(e.to_string()),
        }
    }
}

impl From<AdvisoryError> for AdminError {
    fn from(e: AdvisoryError) -> Self {
        match e {
            AdvisoryError::Decode(_) => AdminError::BadRequest(e.to_string()),
            AdvisoryError::Invocation(_) => AdminError::Unprocessable(e.to_string()),
            AdvisoryError::Encode(_) => AdminError::Internal(e.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub revision: u64,
    pub subscribers: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        revision: state.store.revision(),
        subscribers: state.store.subscriber_count(),
    })
}

pub async fn get_config(State(state): State<AdminState>) -> Json<Arc<FinalConfiguration>> {
    Json(state.store.final_configuration())
}

/// Fragments keyed by feature, in precedence order.
pub async fn get_features(State(state): State<AdminState>) -> Json<BTreeMap<FeatureId, Fragment>> {
    let fragments = state.store.fragments();
    Json(
        fragments
            .iter()
            .map(|(id, fragment)| (id, fragment.clone()))
            .collect(),
    )
}

pub async fn put_feature(
    State(state): State<AdminState>,
    Path(feature): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, AdminError> {
    let id: FeatureId = feature
        .parse()
        .map_err(|e: crate::features::UnknownFeature| AdminError::BadRequest(e.to_string()))?;
    let params = FeatureParams::from_json(id, body)
        .map_err(|e| AdminError::BadRequest(format!("invalid params for {id}: {e}")))?;

    // Subscribers run synchronously inside the update.
    let store = state.store.clone();
    let committed = tokio::task::spawn_blocking(move || store.commit_feature(params))
        .await
        .map_err(|e| AdminError::Internal(e.to_string()))??;

    let revision = HeaderValue::from(committed.revision);
    Ok(([(REVISION_HEADER, revision)], Json(committed.configuration.clone())).into_response())
}

pub async fn post_advisory(
    Path(advisor): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, AdminError> {
    let kind: AdvisorKind = advisor
        .parse()
        .map_err(|e: crate::advisory::UnknownAdvisor| AdminError::NotFound(e.to_string()))?;

    let output = kind.invoke_json(input)?;
    tracing::debug!(advisor = %kind, "Advisory invoked");
    Ok(Json(output))
}
