//! Mock traffic dispatch.
//!
//! # Data Flow
//! ```text
//! (method, path, raw body)
//!     → strip traffic prefix
//!     → store lookup (first method + template match)
//!         miss  → 404 {error, path, method, message}
//!     → body validation (non-empty JSON bodies only)
//!         reject → 400 {error, details}
//!     → stored status + stored body (JSON or plain text)
//! ```

pub mod engine;

pub use engine::{DispatchEngine, MockResponse, Outcome, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
