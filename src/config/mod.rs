//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! composer.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ComposerConfig (validated, immutable)
//!
//! skeleton.json   → loader.rs → validation.rs → BaseSkeleton
//! features.json   → loader.rs → Vec<FeatureParams>
//!
//! On params file change:
//!     watcher.rs detects change
//!     → loader.rs re-reads the params file
//!     → params sent over a channel
//!     → store applies the features whose fragments changed
//! ```
//!
//! # Design Decisions
//! - Process settings are TOML; skeleton and feature params are JSON, the
//!   format the proxy core itself uses
//! - All settings have defaults so an empty file is valid
//! - Validation returns every error, not just the first

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::{
    AdminConfig, ComposerConfig, FeaturesConfig, LogFormat, ObservabilityConfig, OutputConfig,
    SkeletonConfig,
};
