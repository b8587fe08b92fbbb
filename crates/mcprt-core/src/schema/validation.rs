//! Runtime validation of JSON values against JSON Schema documents.
//!
//! Unlike a fail-fast validator, [`validate`] walks the whole document and
//! returns every [`ValidationIssue`] it finds, in the order encountered, so a
//! caller can render the complete list of problems in one response rather
//! than bouncing a tool call back and forth one field at a time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How serious a validation issue is. `Error` and `Critical` cause the
/// overall validation to fail; `Warning` is informational only (e.g. an
/// unrecognised `format` keyword).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

/// A single validation problem, anchored to a dotted JSON path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted/bracketed path to the offending value, e.g. `"address.city"` or
    /// `"tags[2]"`. The empty string refers to the document root.
    pub path: String,
    pub message: String,
    /// A short machine-readable category, e.g. `"type"`, `"required"`, `"enum"`.
    pub code: String,
    pub severity: Severity,
}

impl ValidationIssue {
    fn error(path: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code: code.to_string(),
            severity: Severity::Error,
        }
    }
}

/// Validate `data` against `schema`, returning every issue found (empty if valid).
///
/// Supports the subset of JSON Schema draft 2020-12 that MCP tool/resource
/// schemas use in practice: `type`, `enum`, `required`, `properties`,
/// `additionalProperties`, `items`, `minLength`/`maxLength`,
/// `minimum`/`maximum`, and `pattern`.
pub fn validate(data: &Value, schema: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    walk(data, schema, "", &mut issues);
    issues
}

fn walk(data: &Value, schema: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(schema_obj) = schema.as_object() else {
        return;
    };

    if let Some(schema_type) = schema_obj.get("type").and_then(Value::as_str) {
        if !matches_type(data, schema_type) {
            issues.push(ValidationIssue::error(
                path,
                "type",
                format!("expected {schema_type}, got {}", type_name(data)),
            ));
            return;
        }
    }

    if let Some(enum_values) = schema_obj.get("enum").and_then(Value::as_array) {
        if !enum_values.contains(data) {
            issues.push(ValidationIssue::error(
                path,
                "enum",
                format!("value must be one of {enum_values:?}"),
            ));
        }
    }

    if let Some(pattern) = schema_obj.get("pattern").and_then(Value::as_str) {
        if let Some(s) = data.as_str() {
            match regex::Regex::new(pattern) {
                Ok(re) if !re.is_match(s) => {
                    issues.push(ValidationIssue::error(
                        path,
                        "pattern",
                        format!("value does not match pattern /{pattern}/"),
                    ));
                }
                Err(_) => issues.push(ValidationIssue {
                    path: path.to_string(),
                    message: format!("schema pattern /{pattern}/ is not a valid regex"),
                    code: "pattern".to_string(),
                    severity: Severity::Warning,
                }),
                _ => {}
            }
        }
    }

    if let Some(s) = data.as_str() {
        if let Some(min_len) = schema_obj.get("minLength").and_then(Value::as_u64) {
            if (s.chars().count() as u64) < min_len {
                issues.push(ValidationIssue::error(
                    path,
                    "minLength",
                    format!("string shorter than minimum length {min_len}"),
                ));
            }
        }
        if let Some(max_len) = schema_obj.get("maxLength").and_then(Value::as_u64) {
            if (s.chars().count() as u64) > max_len {
                issues.push(ValidationIssue::error(
                    path,
                    "maxLength",
                    format!("string longer than maximum length {max_len}"),
                ));
            }
        }
    }

    if let Some(n) = data.as_f64() {
        if let Some(min) = schema_obj.get("minimum").and_then(Value::as_f64) {
            if n < min {
                issues.push(ValidationIssue::error(
                    path,
                    "minimum",
                    format!("value {n} is below minimum {min}"),
                ));
            }
        }
        if let Some(max) = schema_obj.get("maximum").and_then(Value::as_f64) {
            if n > max {
                issues.push(ValidationIssue::error(
                    path,
                    "maximum",
                    format!("value {n} is above maximum {max}"),
                ));
            }
        }
    }

    if let Some(array) = data.as_array() {
        if let Some(min_items) = schema_obj.get("minItems").and_then(Value::as_u64) {
            if (array.len() as u64) < min_items {
                issues.push(ValidationIssue::error(
                    path,
                    "minItems",
                    format!("array has fewer than {min_items} items"),
                ));
            }
        }
        if let Some(items_schema) = schema_obj.get("items") {
            for (i, item) in array.iter().enumerate() {
                walk(item, items_schema, &format!("{path}[{i}]"), issues);
            }
        }
    }

    if let Some(obj) = data.as_object() {
        if let Some(required) = schema_obj.get("required").and_then(Value::as_array) {
            for req in required {
                if let Some(name) = req.as_str() {
                    if !obj.contains_key(name) {
                        let field_path = join_path(path, name);
                        issues.push(ValidationIssue::error(
                            field_path,
                            "required",
                            format!("missing required property '{name}'"),
                        ));
                    }
                }
            }
        }

        if let Some(properties) = schema_obj.get("properties").and_then(Value::as_object) {
            for (key, value) in obj {
                if let Some(prop_schema) = properties.get(key) {
                    walk(value, prop_schema, &join_path(path, key), issues);
                }
            }

            if schema_obj
                .get("additionalProperties")
                .and_then(Value::as_bool)
                == Some(false)
            {
                for key in obj.keys() {
                    if !properties.contains_key(key) {
                        issues.push(ValidationIssue::error(
                            join_path(path, key),
                            "additionalProperties",
                            format!("property '{key}' is not allowed"),
                        ));
                    }
                }
            }
        }
    }
}

fn join_path(base: &str, field: &str) -> String {
    if base.is_empty() {
        field.to_string()
    } else {
        format!("{base}.{field}")
    }
}

fn matches_type(value: &Value, schema_type: &str) -> bool {
    match schema_type {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate tool call arguments, returning a typed `MCPError::ToolExecution`
/// carrying the full diagnostic list when invalid.
pub fn validate_tool_arguments(arguments: &Value, schema: &Value) -> crate::error::MCPResult<()> {
    let issues = validate(arguments, schema);
    if issues.iter().any(|i| i.severity != Severity::Warning) {
        return Err(crate::error::MCPError::invalid_tool_arguments(issues));
    }
    Ok(())
}

/// Sanity-check a schema document itself, before it is ever used to validate
/// data against it. Rejects malformed tool/resource schema declarations at
/// registration time rather than letting them fail confusingly on first use.
pub fn validate_tool_schema(schema: &Value) -> Result<(), String> {
    let Some(obj) = schema.as_object() else {
        return Err("schema must be a JSON object".to_string());
    };

    let Some(schema_type) = obj.get("type").and_then(Value::as_str) else {
        return Err("schema is missing a 'type' field".to_string());
    };

    const KNOWN_TYPES: &[&str] = &[
        "string", "number", "integer", "boolean", "array", "object", "null",
    ];
    if !KNOWN_TYPES.contains(&schema_type) {
        return Err(format!("unknown schema type '{schema_type}'"));
    }

    if schema_type == "object" {
        if let Some(properties) = obj.get("properties") {
            let properties = properties
                .as_object()
                .ok_or_else(|| "'properties' must be an object".to_string())?;
            for (name, prop_schema) in properties {
                validate_tool_schema(prop_schema)
                    .map_err(|e| format!("property '{name}': {e}"))?;
            }
        }
        if let Some(required) = obj.get("required") {
            let required = required
                .as_array()
                .ok_or_else(|| "'required' must be an array".to_string())?;
            if !required.iter().all(Value::is_string) {
                return Err("'required' entries must be strings".to_string());
            }
        }
    }

    if schema_type == "array" {
        if let Some(items) = obj.get("items") {
            validate_tool_schema(items).map_err(|e| format!("items: {e}"))?;
        }
    }

    if let Some(pattern) = obj.get("pattern").and_then(Value::as_str) {
        regex::Regex::new(pattern).map_err(|e| format!("invalid 'pattern' regex: {e}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_type_mismatch_is_reported() {
        let schema = json!({"type": "string"});
        let issues = validate(&json!(42), &schema);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "type");
        assert_eq!(issues[0].path, "");
    }

    #[test]
    fn missing_required_property_reports_field_path() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}, "age": {"type": "integer"}},
            "required": ["name"]
        });
        let issues = validate(&json!({"age": 30}), &schema);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "name");
        assert_eq!(issues[0].code, "required");
    }

    #[test]
    fn collects_every_issue_rather_than_failing_fast() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "tags": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["name"]
        });
        let issues = validate(&json!({"tags": ["a", 2]}), &schema);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.path == "name"));
        assert!(issues.iter().any(|i| i.path == "tags[1]"));
    }

    #[test]
    fn valid_document_has_no_issues() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        });
        assert!(validate(&json!({"name": "Ada"}), &schema).is_empty());
    }

    #[test]
    fn tool_arguments_wrapper_returns_invalid_tool_arguments_error() {
        let schema = json!({"type": "object", "required": ["name"]});
        let result = validate_tool_arguments(&json!({}), &schema);
        assert!(result.is_err());
    }

    #[test]
    fn tool_schema_without_a_type_is_rejected() {
        assert!(validate_tool_schema(&json!({"properties": {}})).is_err());
    }

    #[test]
    fn tool_schema_with_unknown_type_is_rejected() {
        assert!(validate_tool_schema(&json!({"type": "widget"})).is_err());
    }

    #[test]
    fn nested_property_schemas_are_checked_recursively() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}, "age": {"type": "not-a-type"}}
        });
        assert!(validate_tool_schema(&schema).is_err());
    }

    #[test]
    fn well_formed_tool_schema_passes() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        });
        assert!(validate_tool_schema(&schema).is_ok());
    }
}
