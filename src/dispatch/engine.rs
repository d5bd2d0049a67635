//! Resolve-validate-respond dispatch for mock traffic.
//!
//! # Responsibilities
//! - Strip the traffic prefix to get the logical path
//! - Look up the first definition matching method + path
//! - Validate non-empty bodies against the definition's rule
//! - Render the stored response verbatim
//!
//! # Design Decisions
//! - Every input yields a response; nothing here returns an error
//! - Read-only: the engine never mutates the store
//! - Lookup misses use a fixed payload distinct from user-configured 404s

use std::sync::Arc;

use axum::http::Method;
use serde::de::IgnoredAny;
use serde_json::{json, Value};

use crate::store::{EndpointDefinition, EndpointRepository, HttpMethod};
use crate::validation::{self, ValidationOutcome, Violation};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// How a request was resolved, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Matched,
    NotFound,
    Rejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Matched => "matched",
            Outcome::NotFound => "not_found",
            Outcome::Rejected => "rejected",
        }
    }
}

/// Transport-neutral response produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub outcome: Outcome,
}

impl MockResponse {
    fn json(status: u16, payload: Value, outcome: Outcome) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body: payload.to_string().into_bytes(),
            outcome,
        }
    }

    fn not_found(method: &str, path: &str) -> Self {
        Self::json(
            404,
            json!({
                "error": "Mock endpoint not found",
                "path": path,
                "method": method,
                "message": "Configure this endpoint through the admin API",
            }),
            Outcome::NotFound,
        )
    }

    fn validation_failed(violations: &[Violation]) -> Self {
        Self::json(
            400,
            json!({
                "error": "Validation failed",
                "details": violations,
            }),
            Outcome::Rejected,
        )
    }

    /// The stored response body, unchanged.
    fn configured(def: &EndpointDefinition) -> Self {
        let content_type = if serde_json::from_str::<IgnoredAny>(&def.response_body).is_ok() {
            CONTENT_TYPE_JSON
        } else {
            CONTENT_TYPE_TEXT
        };
        Self {
            status: def.status_code,
            content_type,
            body: def.response_body.clone().into_bytes(),
            outcome: Outcome::Matched,
        }
    }
}

/// Serves mock traffic from an endpoint store.
pub struct DispatchEngine {
    store: Arc<dyn EndpointRepository>,
    prefix: String,
}

impl DispatchEngine {
    pub fn new(store: Arc<dyn EndpointRepository>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Strip the traffic prefix on a segment boundary. The bare prefix maps to `/`.
    pub fn logical_path<'a>(&self, path: &'a str) -> &'a str {
        match path.strip_prefix(self.prefix.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }

    /// Handle one mock request.
    pub fn handle(&self, method: &Method, path: &str, body: Option<&[u8]>) -> MockResponse {
        let logical = self.logical_path(path);

        let definition = HttpMethod::try_from(method)
            .ok()
            .and_then(|m| self.store.find_by_method_and_path(m, logical));

        let Some(definition) = definition else {
            tracing::warn!(method = %method, path = %logical, "No mock endpoint matched");
            return MockResponse::not_found(method.as_str(), logical);
        };

        tracing::debug!(
            endpoint_id = %definition.id,
            template = %definition.path_template,
            path = %logical,
            "Mock endpoint matched"
        );

        if let Some(body) = structured_body(body) {
            if let ValidationOutcome::Reject(violations) =
                validation::validate(&definition.validation_rule, &body)
            {
                tracing::info!(
                    endpoint_id = %definition.id,
                    violations = violations.len(),
                    "Request body rejected"
                );
                return MockResponse::validation_failed(&violations);
            }
        }

        MockResponse::configured(&definition)
    }
}

/// Parse a raw body into JSON, treating absent, empty or non-JSON bodies as no body.
fn structured_body(raw: Option<&[u8]>) -> Option<Value> {
    let raw = raw.filter(|bytes| !bytes.is_empty())?;
    match serde_json::from_slice::<Value>(raw) {
        Ok(value) if !validation::is_empty_body(&value) => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not JSON, skipping validation");
            None
        }
    }
}
