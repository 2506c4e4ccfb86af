//! Proxy configuration composer library.

pub mod admin;
pub mod advisory;
pub mod composer;
pub mod config;
pub mod features;
pub mod lifecycle;
pub mod observability;
pub mod skeleton;
pub mod store;

pub use composer::{compose, ComposeError};
pub use config::schema::ComposerConfig;
pub use features::{FeatureId, FeatureParams, Fragment, FragmentSet};
pub use lifecycle::Shutdown;
pub use skeleton::{BaseSkeleton, FinalConfiguration};
pub use store::{ConfigStore, StoreError, Subscription};
