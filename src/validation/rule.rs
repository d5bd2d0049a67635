//! Validation rule compilation and evaluation.

use serde::Serialize;
use serde_json::Value;

/// Result of checking a body against a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Permit,
    Reject(Vec<Violation>),
}

impl ValidationOutcome {
    pub fn is_permit(&self) -> bool {
        matches!(self, ValidationOutcome::Permit)
    }
}

/// A single constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON pointer into the request body, empty for the root.
    pub instance_path: String,
    /// JSON pointer into the rule that failed.
    pub schema_path: String,
    pub message: String,
}

/// A rule compiled into a reusable validator.
pub struct CompiledRule {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRule").finish_non_exhaustive()
    }
}

impl CompiledRule {
    /// Compile `rule`, or `None` when it is empty or not a usable schema.
    pub fn compile(rule: &str) -> Option<Self> {
        if rule.trim().is_empty() {
            return None;
        }

        let mut schema: Value = match serde_json::from_str(rule) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::debug!(error = %e, "Validation rule is not JSON, permitting");
                return None;
            }
        };
        open_by_default(&mut schema);

        match jsonschema::options().should_validate_formats(true).build(&schema) {
            Ok(validator) => Some(Self { validator }),
            Err(e) => {
                tracing::debug!(error = %e, "Validation rule does not compile, permitting");
                None
            }
        }
    }

    /// Check `body`, collecting every violation.
    pub fn check(&self, body: &Value) -> ValidationOutcome {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(body)
            .map(|error| Violation {
                instance_path: error.instance_path.to_string(),
                schema_path: error.schema_path.to_string(),
                message: error.to_string(),
            })
            .collect();

        if violations.is_empty() {
            ValidationOutcome::Permit
        } else {
            ValidationOutcome::Reject(violations)
        }
    }
}

/// Object schemas that say nothing about extra properties allow them.
fn open_by_default(schema: &mut Value) {
    if let Value::Object(map) = schema {
        let is_object = map.get("type").and_then(Value::as_str) == Some("object");
        if is_object && !map.contains_key("additionalProperties") {
            map.insert("additionalProperties".to_string(), Value::Bool(true));
        }
    }
}

/// True for bodies that count as "no body": `null`, `{}`, `[]` and `""`.
///
/// Callers skip validation entirely for these.
pub fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Validate `body` against `rule`.
///
/// Permissive: an empty rule or one that cannot be compiled always
/// yields `Permit`.
pub fn validate(rule: &str, body: &Value) -> ValidationOutcome {
    match CompiledRule::compile(rule) {
        Some(compiled) => compiled.check(body),
        None => ValidationOutcome::Permit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NAME_RULE: &str =
        r#"{"type":"object","properties":{"name":{"type":"string"}},"required":["name"]}"#;

    #[test]
    fn test_extra_fields_allowed() {
        let outcome = validate(NAME_RULE, &json!({"name": "x", "extra": 1}));
        assert_eq!(outcome, ValidationOutcome::Permit);
    }

    #[test]
    fn test_missing_required_field() {
        let outcome = validate(NAME_RULE, &json!({}));
        match outcome {
            ValidationOutcome::Reject(violations) => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].message.contains("name"));
            }
            ValidationOutcome::Permit => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_all_violations_reported() {
        let rule = r#"{
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer", "minimum": 0}
            },
            "required": ["name", "email"]
        }"#;
        let outcome = validate(rule, &json!({"name": 5, "age": -1}));
        match outcome {
            ValidationOutcome::Reject(violations) => {
                assert_eq!(violations.len(), 3);
                assert!(violations.iter().any(|v| v.instance_path == "/name"));
                assert!(violations.iter().any(|v| v.instance_path == "/age"));
                assert!(violations.iter().any(|v| v.message.contains("email")));
            }
            ValidationOutcome::Permit => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_explicit_closed_schema_is_honored() {
        let rule = r#"{"type":"object","properties":{"name":{"type":"string"}},"additionalProperties":false}"#;
        assert!(!validate(rule, &json!({"name": "x", "extra": 1})).is_permit());
        assert!(validate(rule, &json!({"name": "x"})).is_permit());
    }

    #[test]
    fn test_permissive_rules() {
        let body = json!({"anything": [1, 2, 3]});
        assert!(validate("{}", &body).is_permit());
        assert!(validate("", &body).is_permit());
        assert!(validate("   ", &body).is_permit());
        assert!(validate("not a schema", &body).is_permit());
        assert!(validate(r#"{"type": 12}"#, &body).is_permit());
    }

    #[test]
    fn test_empty_bodies() {
        assert!(is_empty_body(&json!({})));
        assert!(is_empty_body(&Value::Null));
        assert!(is_empty_body(&json!([])));
        assert!(is_empty_body(&json!("")));
        assert!(!is_empty_body(&json!(0)));
        assert!(!is_empty_body(&json!(false)));
        assert!(!is_empty_body(&json!({"a": null})));
    }

    #[test]
    fn test_formats_are_enforced() {
        let rule = r#"{
            "type": "object",
            "properties": {
                "email": {"type": "string", "format": "email"},
                "at": {"type": "string", "format": "date-time"}
            }
        }"#;
        match validate(rule, &json!({"email": "not-an-email", "at": "yesterday"})) {
            ValidationOutcome::Reject(violations) => {
                assert_eq!(violations.len(), 2);
                assert!(violations.iter().any(|v| v.instance_path == "/email"));
                assert!(violations.iter().any(|v| v.instance_path == "/at"));
            }
            ValidationOutcome::Permit => panic!("expected rejection"),
        }

        let valid = json!({"email": "ada@example.com", "at": "2024-05-01T12:30:00Z"});
        assert!(validate(rule, &valid).is_permit());
    }

    #[test]
    fn test_non_object_bodies_are_checked() {
        assert!(!validate(NAME_RULE, &json!(42)).is_permit());
        assert!(!validate(r#"{"type":"array","minItems":3}"#, &json!([1])).is_permit());
    }

    #[test]
    fn test_open_by_default_injection() {
        let mut schema = json!({"type": "object"});
        open_by_default(&mut schema);
        assert_eq!(schema["additionalProperties"], json!(true));

        let mut closed = json!({"type": "object", "additionalProperties": false});
        open_by_default(&mut closed);
        assert_eq!(closed["additionalProperties"], json!(false));

        let mut array = json!({"type": "array"});
        open_by_default(&mut array);
        assert!(array.get("additionalProperties").is_none());
    }
}
