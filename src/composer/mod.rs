//! Configuration composition.
//!
//! # Data Flow
//! ```text
//! BaseSkeleton + FragmentSet
//!     → merge.rs (copy skeleton, shallow-merge fragments into `other`
//!       in FeatureId::PRECEDENCE order, later wins)
//!     → augment.rs (targeted, schema-aware writes to named skeleton paths)
//!     → FinalConfiguration
//! ```
//!
//! # Design Decisions
//! - Pure: inputs are borrowed and never mutated; output is rebuilt from
//!   scratch on every call
//! - Fragment keys never touch skeleton fields, even when names coincide
//! - Augmentations replace their target instead of appending, so feeding a
//!   result's skeleton back in yields the same output

pub mod augment;
pub mod error;
pub mod merge;

pub use error::ComposeError;
pub use merge::{compose, compose_traced, Collision, MergeTrace};
