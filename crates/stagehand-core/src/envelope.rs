//! Response envelope
//!
//! Every action, on every tool, answers with the same flat shape:
//!
//! ```json
//! { "success": true, "message": "...", ...action fields... }
//! { "success": false, "error": "...", "error_code": "MISSING_PROPERTY" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ErrorCode, OperationError, ValidationError};
use crate::validate::Diagnostic;

/// Uniform response returned for every tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    /// Non-fatal diagnostics, e.g. ignored duplicate aliases
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Action-specific fields, serialised at the top level
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ResponseEnvelope {
    /// Successful response carrying an Operation's output
    ///
    /// A string `message` member of the output becomes the envelope message.
    pub fn ok(mut data: Map<String, Value>) -> Self {
        let message = match data.remove("message") {
            Some(Value::String(message)) => Some(message),
            Some(other) => {
                data.insert("message".to_string(), other);
                None
            }
            None => None,
        };
        Self {
            success: true,
            message,
            error: None,
            error_code: None,
            warnings: Vec::new(),
            data,
        }
    }

    /// Failed response; carries no action-specific fields
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: Some(message.clone()),
            error: Some(message),
            error_code: Some(code),
            warnings: Vec::new(),
            data: Map::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_warnings(mut self, diagnostics: &[Diagnostic]) -> Self {
        self.warnings.extend(diagnostics.iter().map(ToString::to_string));
        self
    }

    /// Serialise to a JSON value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({
                "success": false,
                "error": format!("Failed to serialise response: {e}"),
                "error_code": ErrorCode::InternalError,
            })
        })
    }

    /// Serialise to pretty-printed JSON text
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_value()).unwrap_or_default()
    }
}

impl From<OperationError> for ResponseEnvelope {
    fn from(err: OperationError) -> Self {
        Self::failure(err.code, err.message)
    }
}

impl From<ValidationError> for ResponseEnvelope {
    fn from(err: ValidationError) -> Self {
        Self::failure(err.code, err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_is_flat() {
        let mut data = Map::new();
        data.insert("row_name".to_string(), json!("A"));
        data.insert("message".to_string(), json!("Row added"));

        let value = ResponseEnvelope::ok(data).to_value();
        assert_eq!(
            value,
            json!({"success": true, "message": "Row added", "row_name": "A"})
        );
    }

    #[test]
    fn test_failure_has_code_and_no_data() {
        let envelope: ResponseEnvelope =
            OperationError::new(ErrorCode::RowNotFound, "Row 'Z' not found").into();
        let value = envelope.to_value();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error_code"], json!("ROW_NOT_FOUND"));
        assert_eq!(value["error"], json!("Row 'Z' not found"));
        assert_eq!(value.as_object().map(Map::len), Some(4));
    }

    #[test]
    fn test_round_trip_through_json() {
        let envelope = ResponseEnvelope::failure(ErrorCode::Timeout, "too slow");
        let parsed: Result<ResponseEnvelope, _> = serde_json::from_value(envelope.to_value());
        assert_eq!(parsed.ok(), Some(envelope));
    }
}
