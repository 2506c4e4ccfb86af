//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate the skeleton
//! - Build the store and register the output writer
//! - Apply the initial feature params
//!
//! # Design Decisions
//! - Fail fast: skeleton and output errors at startup are fatal
//! - Rejected feature updates are logged and skipped, as they are at runtime

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::composer::ComposeError;
use crate::config::loader::{load_feature_params, load_skeleton};
use crate::config::{ComposerConfig, ConfigError};
use crate::features::FeatureParams;
use crate::skeleton::{BaseSkeleton, FinalConfiguration};
use crate::store::ConfigStore;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("skeleton cannot be composed: {0}")]
    Compose(#[from] ComposeError),

    #[error("cannot write output {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes composed configurations to disk.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    path: PathBuf,
    pretty: bool,
}

impl OutputWriter {
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
        }
    }

    /// Replace the output file. Readers never observe a half-written file.
    pub fn write(&self, config: &FinalConfiguration) -> io::Result<()> {
        let body = if self.pretty {
            serde_json::to_vec_pretty(config)?
        } else {
            serde_json::to_vec(config)?
        };

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of applying a batch of feature params.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub unchanged: usize,
    pub rejected: usize,
}

/// Apply params in order, skipping features whose fragment would not change.
pub fn apply_params(store: &ConfigStore, params: Vec<FeatureParams>) -> ApplySummary {
    let mut summary = ApplySummary::default();

    for params in params {
        let feature = params.id();
        if params.produce() == store.fragment(feature) {
            summary.unchanged += 1;
            continue;
        }
        match store.update_feature(params) {
            Ok(_) => summary.applied += 1,
            Err(e) => {
                tracing::warn!(feature = %feature, error = %e, "Skipping feature params");
                summary.rejected += 1;
            }
        }
    }

    tracing::info!(
        applied = summary.applied,
        unchanged = summary.unchanged,
        rejected = summary.rejected,
        "Feature params applied"
    );
    summary
}

/// Build a ready store from process settings.
pub fn bootstrap(config: &ComposerConfig) -> Result<Arc<ConfigStore>, StartupError> {
    let skeleton = match &config.skeleton.path {
        Some(path) => load_skeleton(Path::new(path))?,
        None => BaseSkeleton::default(),
    };
    let store = Arc::new(ConfigStore::new(skeleton)?);

    if let Some(path) = &config.output.path {
        let writer = OutputWriter::new(path, config.output.pretty);
        writer
            .write(&store.final_configuration())
            .map_err(|source| StartupError::Output {
                path: writer.path().to_path_buf(),
                source,
            })?;

        let _subscription = store.subscribe(move |composed| {
            if let Err(e) = writer.write(composed) {
                tracing::error!(
                    path = %writer.path().display(),
                    error = %e,
                    "Failed to write composed configuration"
                );
            }
        });
        tracing::info!(path = %path, "Writing composed configuration on every update");
    }

    if let Some(path) = &config.features.params_path {
        let params = load_feature_params(Path::new(path))?;
        apply_params(&store, params);
    }

    Ok(store)
}
