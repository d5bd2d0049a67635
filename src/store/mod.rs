//! Endpoint storage subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     backing file (JSON array)
//!     → persistence.rs (load, check records)
//!     → memory.rs (ordered collection)
//!
//! Admin mutation (create/update/delete):
//!     → memory.rs (apply under write lock)
//!     → persistence.rs (dirty signal → debounced full rewrite)
//!
//! Mock traffic:
//!     → memory.rs find_by_method_and_path (read lock, first match)
//! ```
//!
//! # Design Decisions
//! - Stores are used through `EndpointRepository` (`Arc<dyn EndpointRepository>`)
//! - Explicit insertion order instead of relying on map iteration
//! - Write-back is decoupled from the request path

pub mod endpoint;
pub mod memory;
pub mod persistence;

pub use endpoint::{EndpointDefinition, EndpointInput, FieldError, HttpMethod};
pub use memory::{EndpointRepository, MemoryStore, StoreError};
pub use persistence::{PersistenceError, PersistentStore};
