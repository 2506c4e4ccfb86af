//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! store, admin API, watcher produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (update counters, compose latency, subscriber gauge)
//!
//! Consumers:
//!     → stdout (pretty for development, JSON for log shipping)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Metric updates go through the `metrics` facade; they are no-ops until
//!   an exporter is installed
//! - `RUST_LOG` overrides the configured log level

pub mod logging;
pub mod metrics;
