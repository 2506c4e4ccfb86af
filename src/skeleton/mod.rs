//! Proxy configuration skeleton.
//!
//! # Data Flow
//! ```text
//! BaseSkeleton (built-in default or skeleton.json)
//!     → composer copies it
//!     → fragments merged into `other`, targeted augmentations applied
//!     → FinalConfiguration (serialized to the Xray-style JSON tree)
//! ```
//!
//! # Design Decisions
//! - Skeleton sections are strongly typed; protocol `settings` stay opaque JSON
//! - The skeleton's inbound/outbound/policy shape survives every composition
//! - `other` is only ever written by the composer

pub mod final_config;
pub mod types;

pub use final_config::FinalConfiguration;
pub use types::{BaseSkeleton, Inbound, LogConfig, LogLevel, Outbound, Policy, PolicyLevel, Protocol};
