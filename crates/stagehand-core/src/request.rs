//! Request envelope parsing
//!
//! A tool call arrives as `{"Action": "...", "ParamsJson": ...}`. `ParamsJson`
//! is either an object or a string holding JSON-encoded object text; both are
//! normalised into a single parameter map here.

use serde_json::{Map, Value};

use crate::error::{ErrorCode, ValidationError};

const ACTION_KEYS: &[&str] = &["Action", "action"];
const PARAMS_KEYS: &[&str] = &["ParamsJson", "params_json", "Params", "params"];

/// A parsed tool call
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub action: String,
    pub params: Map<String, Value>,
}

impl Request {
    pub fn new(action: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }

    /// Parse a full request envelope
    pub fn from_value(envelope: &Value) -> Result<Self, ValidationError> {
        let Some(body) = envelope.as_object() else {
            return Err(ValidationError::new(
                ErrorCode::InvalidRequest,
                None,
                "Request must be a JSON object with 'Action' and 'ParamsJson'",
            ));
        };

        let action = match first_present(body, ACTION_KEYS) {
            Some(Value::String(action)) if !action.trim().is_empty() => action.trim().to_string(),
            Some(Value::String(_)) | None => {
                return Err(ValidationError::new(
                    ErrorCode::MissingProperty,
                    Some("Action"),
                    "Missing required property 'Action'",
                ));
            }
            Some(other) => {
                return Err(ValidationError::new(
                    ErrorCode::InvalidRequest,
                    Some("Action"),
                    format!("'Action' must be a string, got {other}"),
                ));
            }
        };

        let params = parse_params(first_present(body, PARAMS_KEYS).unwrap_or(&Value::Null))?;
        Ok(Self { action, params })
    }

    /// Parse a request from raw JSON text
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let envelope: Value = serde_json::from_str(text).map_err(|e| {
            ValidationError::new(
                ErrorCode::InvalidRequest,
                None,
                format!("Request is not valid JSON: {e}"),
            )
        })?;
        Self::from_value(&envelope)
    }
}

fn first_present<'a>(body: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| body.get(*key))
        .find(|value| !value.is_null())
}

/// Normalise a `ParamsJson` value to a parameter map
///
/// Accepts an object, a string holding a JSON object, an empty string, or
/// null (both of the latter mean "no parameters").
pub fn parse_params(value: &Value) -> Result<Map<String, Value>, ValidationError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Map::new()),
        Value::String(text) if text.trim().is_empty() => Ok(Map::new()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ValidationError::new(
                ErrorCode::InvalidRequest,
                Some("ParamsJson"),
                format!(
                    "'ParamsJson' must encode a JSON object, got {}",
                    crate::field::json_type_name(&other)
                ),
            )),
            Err(e) => Err(ValidationError::new(
                ErrorCode::InvalidRequest,
                Some("ParamsJson"),
                format!("'ParamsJson' is not valid JSON: {e}"),
            )),
        },
        other => Err(ValidationError::new(
            ErrorCode::InvalidRequest,
            Some("ParamsJson"),
            format!(
                "'ParamsJson' must be an object or a JSON string, got {}",
                crate::field::json_type_name(other)
            ),
        )),
    }
}
