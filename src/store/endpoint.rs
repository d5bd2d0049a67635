//! Endpoint definition model.
//!
//! # Responsibilities
//! - Define the unit of configuration (`EndpointDefinition`)
//! - Define the id-less input accepted from the admin surface
//! - Check field invariants (path shape, status range)
//!
//! # Design Decisions
//! - Wire/file format uses camelCase keys
//! - `id` is never part of the input; the store assigns it
//! - Method set is closed: anything else never matches

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP methods an endpoint can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method name is outside the configurable set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnsupportedMethod(s.to_string()))
    }
}

impl TryFrom<&axum::http::Method> for HttpMethod {
    type Error = UnsupportedMethod;

    /// HTTP method names are case-sensitive on the wire, so `get` is not GET.
    fn try_from(method: &axum::http::Method) -> Result<Self, Self::Error> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == method.as_str())
            .ok_or_else(|| UnsupportedMethod(method.to_string()))
    }
}

/// A configured virtual endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDefinition {
    /// Opaque id, assigned at creation.
    pub id: String,
    pub method: HttpMethod,
    /// Route template, e.g. `/api/users/:id`.
    pub path_template: String,
    /// JSON schema text. Empty or unparsable means "no constraint".
    #[serde(default)]
    pub validation_rule: String,
    /// Literal response payload.
    #[serde(default)]
    pub response_body: String,
    pub status_code: u16,
}

impl EndpointDefinition {
    /// Attach an id to an input.
    pub fn from_input(id: String, input: EndpointInput) -> Self {
        Self {
            id,
            method: input.method,
            path_template: input.path_template,
            validation_rule: input.validation_rule,
            response_body: input.response_body,
            status_code: input.status_code,
        }
    }

    /// Check the definition's invariants, including a non-empty id.
    pub fn check(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = check_fields(&self.path_template, self.status_code);
        if self.id.is_empty() {
            errors.insert(0, FieldError::new("id", "must not be empty"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Everything but the id; what the admin surface sends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInput {
    pub method: HttpMethod,
    pub path_template: String,
    #[serde(default)]
    pub validation_rule: String,
    #[serde(default)]
    pub response_body: String,
    pub status_code: u16,
}

impl EndpointInput {
    /// Validate field invariants, reporting every violation.
    pub fn check(&self) -> Result<(), Vec<FieldError>> {
        let errors = check_fields(&self.path_template, self.status_code);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A single invalid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_fields(path_template: &str, status_code: u16) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if path_template.is_empty() {
        errors.push(FieldError::new("pathTemplate", "must not be empty"));
    } else if !path_template.starts_with('/') {
        errors.push(FieldError::new("pathTemplate", "must start with '/'"));
    }

    if !(100..=599).contains(&status_code) {
        errors.push(FieldError::new(
            "statusCode",
            format!("{} is outside 100..=599", status_code),
        ));
    }

    errors
}
