//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, trace span)
//!     → traffic prefix → dispatch engine
//!       admin prefix   → admin handlers
//!     → response.rs (MockResponse → HTTP response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
