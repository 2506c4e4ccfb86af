//! Configuration store.
//!
//! # Data Flow
//! ```text
//! update_feature(params)
//!     → lock writer (one update at a time)
//!     → producer builds the fragment
//!     → candidate FragmentSet = current set with the slot replaced
//!     → composer builds the FinalConfiguration from the candidate set
//!     → on success: swap in the new snapshot, notify subscribers in order
//!     → on failure: nothing changes, nobody is notified
//! ```
//!
//! # Design Decisions
//! - Fragments, configuration and revision live in one immutable snapshot
//!   published through `ArcSwap`; readers never block and never see a
//!   fragment without its matching configuration
//! - The writer lock is held while subscribers run, so notifications arrive
//!   in update order
//! - The thread holding the writer lock is recorded; an update issued from
//!   that thread (a subscriber writing back into its own store) fails with
//!   [`StoreError::Reentrant`] instead of waiting on itself
//! - A panicking subscriber is logged and skipped; the commit it observed
//!   stands and the remaining subscribers still run

pub mod subscribers;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Instant;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::composer::{compose, compose_traced, ComposeError};
use crate::features::{FeatureId, FeatureParams, Fragment, FragmentSet};
use crate::observability::metrics;
use crate::skeleton::{BaseSkeleton, FinalConfiguration};

pub use subscribers::{Callback, Subscription};
use subscribers::SubscriberRegistry;

/// Errors returned by [`ConfigStore::update_feature`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("composition failed for {feature}: {source}")]
    Compose {
        feature: FeatureId,
        #[source]
        source: ComposeError,
    },

    #[error("update of {feature} issued while the same store is notifying subscribers")]
    Reentrant { feature: FeatureId },
}

impl StoreError {
    pub fn feature(&self) -> FeatureId {
        match self {
            StoreError::Compose { feature, .. } | StoreError::Reentrant { feature } => *feature,
        }
    }
}

/// Consistent view of the store at one revision.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Number of committed updates.
    pub revision: u64,
    pub fragments: FragmentSet,
    pub configuration: Arc<FinalConfiguration>,
}

/// Holds the latest fragment per feature and the configuration composed
/// from them.
pub struct ConfigStore {
    skeleton: BaseSkeleton,
    writer: Mutex<()>,
    writer_thread: Mutex<Option<ThreadId>>,
    state: ArcSwap<Snapshot>,
    subscribers: Arc<SubscriberRegistry>,
}

/// Writer lock plus the record of which thread holds it. The record is
/// cleared before the lock is released.
struct WriterGuard<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
    _lock: MutexGuard<'a, ()>,
}

impl Drop for WriterGuard<'_> {
    fn drop(&mut self) {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ConfigStore {
    /// Create a store with all fragments empty.
    pub fn new(skeleton: BaseSkeleton) -> Result<Self, ComposeError> {
        let fragments = FragmentSet::empty();
        let configuration = Arc::new(compose(&skeleton, &fragments)?);

        tracing::debug!(
            inbounds = skeleton.inbounds.len(),
            outbounds = skeleton.outbounds.len(),
            "Config store initialized"
        );

        Ok(Self {
            skeleton,
            writer: Mutex::new(()),
            writer_thread: Mutex::new(None),
            state: ArcSwap::from_pointee(Snapshot {
                revision: 0,
                fragments,
                configuration,
            }),
            subscribers: Arc::new(SubscriberRegistry::default()),
        })
    }

    /// Replace one feature's fragment and recompose.
    ///
    /// Either the fragment, the configuration and the notifications all
    /// advance, or none of them do.
    pub fn update_feature(
        &self,
        params: FeatureParams,
    ) -> Result<Arc<FinalConfiguration>, StoreError> {
        self.commit_feature(params)
            .map(|snapshot| snapshot.configuration.clone())
    }

    /// Like [`update_feature`](Self::update_feature), returning the whole
    /// committed snapshot so callers can report the revision their update
    /// produced rather than whatever is current by the time they look.
    pub fn commit_feature(&self, params: FeatureParams) -> Result<Arc<Snapshot>, StoreError> {
        let feature = params.id();
        let _writer = self.lock_writer(feature)?;

        let current = self.state.load_full();
        let fragment = params.produce();
        let key_count = fragment.len();

        let mut fragments = current.fragments.clone();
        fragments.replace(feature, fragment);

        let started = Instant::now();
        let (configuration, trace) = match compose_traced(&self.skeleton, &fragments) {
            Ok(composed) => composed,
            Err(source) => {
                tracing::warn!(
                    feature = %feature,
                    error = %source,
                    "Feature update rejected, keeping current configuration"
                );
                metrics::record_update(feature, "rejected");
                return Err(StoreError::Compose { feature, source });
            }
        };
        metrics::record_compose_duration(started);

        for collision in &trace.collisions {
            tracing::debug!(
                key = %collision.key,
                overridden = %collision.overridden,
                winner = %collision.winner,
                "Fragment key collision"
            );
        }

        let revision = current.revision + 1;
        let snapshot = Arc::new(Snapshot {
            revision,
            fragments,
            configuration: Arc::new(configuration),
        });
        self.state.store(snapshot.clone());

        tracing::info!(
            feature = %feature,
            revision,
            keys = key_count,
            credentials_attached = trace.credentials_attached,
            "Feature updated"
        );
        metrics::record_update(feature, "applied");
        metrics::record_revision(revision);

        for (position, callback) in self.subscribers.snapshot().into_iter().enumerate() {
            let notified = catch_unwind(AssertUnwindSafe(|| callback(&snapshot.configuration)));
            if let Err(payload) = notified {
                tracing::error!(
                    feature = %feature,
                    revision,
                    subscriber = position,
                    panic = panic_message(payload.as_ref()),
                    "Subscriber panicked, continuing with remaining subscribers"
                );
            }
        }

        Ok(snapshot)
    }

    fn lock_writer(&self, feature: FeatureId) -> Result<WriterGuard<'_>, StoreError> {
        let me = thread::current().id();
        if *self.writer_thread.lock().unwrap_or_else(PoisonError::into_inner) == Some(me) {
            tracing::error!(
                feature = %feature,
                "Feature update issued from a subscriber of the same store, rejecting"
            );
            metrics::record_update(feature, "reentrant");
            return Err(StoreError::Reentrant { feature });
        }

        let lock = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        *self.writer_thread.lock().unwrap_or_else(PoisonError::into_inner) = Some(me);
        Ok(WriterGuard {
            owner: &self.writer_thread,
            _lock: lock,
        })
    }

    /// The current configuration.
    pub fn final_configuration(&self) -> Arc<FinalConfiguration> {
        self.state.load().configuration.clone()
    }

    /// Fragments, configuration and revision from the same commit.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.state.load_full()
    }

    pub fn fragment(&self, id: FeatureId) -> Fragment {
        self.state.load().fragments.get(id).clone()
    }

    pub fn fragments(&self) -> FragmentSet {
        self.state.load().fragments.clone()
    }

    pub fn revision(&self) -> u64 {
        self.state.load().revision
    }

    pub fn skeleton(&self) -> &BaseSkeleton {
        &self.skeleton
    }

    /// Register a callback invoked after every committed update.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<FinalConfiguration>) + Send + Sync + 'static,
    {
        let id = self.subscribers.register(Arc::new(callback));
        Subscription::new(id, &self.subscribers)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("revision", &self.revision())
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{HyperPerformanceParams, QuantumSafeSupremeParams};
    use serde_json::json;

    #[test]
    fn test_new_store_is_empty() {
        let store = ConfigStore::new(BaseSkeleton::default()).unwrap();

        assert_eq!(store.revision(), 0);
        assert!(store.fragments().is_empty());
        assert!(store.final_configuration().other.is_empty());
    }

    #[test]
    fn test_update_bumps_revision_and_returns_config() {
        let store = ConfigStore::new(BaseSkeleton::default()).unwrap();
        let returned = store
            .update_feature(FeatureParams::HyperPerformance(HyperPerformanceParams {
                tcp_fast_open: true,
                ..Default::default()
            }))
            .unwrap();

        assert_eq!(store.revision(), 1);
        assert_eq!(returned.other["tcpFastOpen"], json!(true));
        assert!(Arc::ptr_eq(&returned, &store.final_configuration()));
    }

    #[test]
    fn test_snapshot_is_consistent() {
        let store = ConfigStore::new(BaseSkeleton::default()).unwrap();
        store
            .update_feature(FeatureParams::QuantumSafeSupreme(QuantumSafeSupremeParams::default()))
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(
            snapshot.configuration.other["pqAlgorithm"],
            *snapshot.fragments.get(FeatureId::QuantumSafeSupreme).get("pqAlgorithm").unwrap()
        );
    }

    #[test]
    fn test_store_error_reports_feature() {
        let err = StoreError::Compose {
            feature: FeatureId::QuantumSafeSupreme,
            source: ComposeError::SchemaMismatch {
                path: "outbounds[0].settings.vnext".into(),
                expected: "array",
                found: "string",
            },
        };
        assert_eq!(err.feature(), FeatureId::QuantumSafeSupreme);
        assert!(err.to_string().contains("quantumSafeSupreme"));

        let err = StoreError::Reentrant {
            feature: FeatureId::Infrastructure,
        };
        assert_eq!(err.feature(), FeatureId::Infrastructure);
    }
}
