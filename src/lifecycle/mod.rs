//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load skeleton → Build store → Register output writer → Apply initial params
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast to admin server and watcher loop → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Re-read feature params
//! ```
//!
//! # Design Decisions
//! - Ordered startup: skeleton first, then store, then listeners
//! - Any startup error is fatal; errors after startup are scoped to one update

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{next_signal, Signal};
pub use startup::{apply_params, bootstrap, StartupError};
