//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming mock request (method, logical path)
//!     → store lookup walks definitions in insertion order
//!     → matcher.rs (template vs. literal path)
//!     → Return: first matching definition or NoMatch
//! ```
//!
//! # Design Decisions
//! - Deterministic: same store contents + input always match the same definition
//! - First match wins (store iteration order); overlapping templates are not rejected

pub mod matcher;

pub use matcher::matches;
