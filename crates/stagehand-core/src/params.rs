//! Resolved parameters handed to Operations

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ErrorCode, OperationError};

/// Validated, alias-resolved parameters for one request
///
/// Keys are canonical field names. Every value has already been type-checked
/// against its field spec, so the typed accessors only fail for fields the
/// Operation reads without having declared them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedParameters {
    values: BTreeMap<String, Value>,
    /// one-of group name -> winning member field
    #[serde(skip)]
    identifiers: BTreeMap<String, String>,
}

impl ResolvedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    pub(crate) fn set_identifier(&mut self, group: &str, field: &str) {
        self.identifiers.insert(group.to_string(), field.to_string());
    }

    /// Copy with `field` replaced, used to hand a single batch item to an Operation
    pub fn with(&self, field: &str, value: Value) -> Self {
        let mut next = self.clone();
        next.insert(field, value);
        next
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The member of a one-of group that was supplied, with its value
    pub fn identifier(&self, group: &str) -> Option<(&str, &Value)> {
        let field = self.identifiers.get(group)?;
        self.values.get(field).map(|value| (field.as_str(), value))
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    pub fn i64(&self, field: &str) -> Option<i64> {
        self.get(field)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|n| n as i64)))
    }

    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    pub fn object(&self, field: &str) -> Option<&Map<String, Value>> {
        self.get(field).and_then(Value::as_object)
    }

    pub fn array(&self, field: &str) -> Option<&Vec<Value>> {
        self.get(field).and_then(Value::as_array)
    }

    pub fn require_str(&self, field: &str) -> Result<&str, OperationError> {
        self.str(field).ok_or_else(|| missing(field, "string"))
    }

    pub fn require_f64(&self, field: &str) -> Result<f64, OperationError> {
        self.f64(field).ok_or_else(|| missing(field, "number"))
    }

    pub fn require_bool(&self, field: &str) -> Result<bool, OperationError> {
        self.bool(field).ok_or_else(|| missing(field, "bool"))
    }

    pub fn require_object(&self, field: &str) -> Result<&Map<String, Value>, OperationError> {
        self.object(field).ok_or_else(|| missing(field, "object"))
    }

    pub fn require_array(&self, field: &str) -> Result<&Vec<Value>, OperationError> {
        self.array(field).ok_or_else(|| missing(field, "array"))
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values.into_iter().collect()
    }
}

fn missing(field: &str, expected: &str) -> OperationError {
    OperationError::new(
        ErrorCode::InvalidValue,
        format!("Parameter '{field}' is missing or is not a {expected}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_access() {
        let mut params = ResolvedParameters::new();
        params.insert("table_path", json!("/Game/T"));
        params.insert("count", json!(3));
        params.insert("confirm", json!(true));

        assert_eq!(params.str("table_path"), Some("/Game/T"));
        assert_eq!(params.i64("count"), Some(3));
        assert_eq!(params.bool("confirm"), Some(true));
        assert!(params.require_object("table_path").is_err());
    }

    #[test]
    fn test_require_reports_invalid_value() {
        let params = ResolvedParameters::new();
        let err = params.require_str("row_name").err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::InvalidValue));
    }

    #[test]
    fn test_with_replaces_field() {
        let mut params = ResolvedParameters::new();
        params.insert("rows", json!({"A": {}}));
        let item = params.with("rows", json!("A"));
        assert_eq!(item.str("rows"), Some("A"));
        assert!(params.object("rows").is_some());
    }
}
