//! Mock API server library.
//!
//! Serves live HTTP traffic against a configurable set of virtual endpoints
//! (method + path template + validation rule + canned response).

pub mod admin;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod store;
pub mod validation;

pub use config::schema::ServerConfig;
pub use dispatch::DispatchEngine;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{EndpointRepository, MemoryStore, PersistentStore};
