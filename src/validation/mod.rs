//! Request body validation.
//!
//! # Data Flow
//! ```text
//! validationRule (string)
//!     → parse as JSON (failure = no constraint)
//!     → open object schemas by default (additionalProperties: true)
//!     → compile with jsonschema
//!     → check body, collecting every violation
//!     → Permit | Reject(violations)
//! ```
//!
//! # Design Decisions
//! - Permissive: only constraints a rule states explicitly are enforced
//! - Malformed rules never fail a request
//! - All violations are reported, not just the first

pub mod rule;

pub use rule::{is_empty_body, validate, CompiledRule, ValidationOutcome, Violation};
