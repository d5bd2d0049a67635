//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Load store → Start flusher → Start listener
//!
//! Shutdown:
//!     SIGTERM/SIGINT (signals.rs)
//!     → Shutdown::trigger (shutdown.rs)
//!     → HTTP server stops accepting and drains
//!     → store flusher writes pending state and exits
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then store, then listener
//! - Traffic is accepted only after the store is loaded

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
