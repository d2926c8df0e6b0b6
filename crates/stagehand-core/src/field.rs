//! Field specifications
//!
//! A [`FieldSpec`] declares one logical parameter of an action: its canonical
//! name, the alternate names callers may use for it, the JSON type it must
//! hold, and an optional default.

use serde::Serialize;
use serde_json::Value;

/// JSON type a parameter value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    /// A number with no fractional part
    Integer,
    Bool,
    Object,
    Array,
    /// Any non-null value
    Any,
}

impl FieldType {
    /// Check whether a JSON value satisfies this type (no coercion)
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|n| n.fract() == 0.0)
            }
            Self::Bool => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Any => !value.is_null(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Object => "object",
            Self::Array => "array",
            Self::Any => "any",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of the JSON type a value actually has, for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declaration of one logical parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Canonical name, used as the key in resolved parameters
    pub name: String,
    /// Alternate accepted names (matched case-insensitively)
    pub aliases: Vec<String>,
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            ty,
            required: false,
            default: None,
            description: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Object)
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Array)
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Any)
    }

    /// Add an accepted alternate name
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add several alternate names at once
    pub fn aliases<I, A>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value applied when the field is absent
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Every name this field answers to, canonical first
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `key` names this field (case-insensitive)
    pub fn answers_to(&self, key: &str) -> bool {
        self.all_names().any(|name| name.eq_ignore_ascii_case(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_matching() {
        assert!(FieldType::String.matches(&json!("a")));
        assert!(!FieldType::String.matches(&json!(1)));
        assert!(FieldType::Number.matches(&json!(1.5)));
        assert!(FieldType::Integer.matches(&json!(3)));
        assert!(FieldType::Integer.matches(&json!(3.0)));
        assert!(!FieldType::Integer.matches(&json!(3.5)));
        assert!(FieldType::Array.matches(&json!([])));
        assert!(FieldType::Any.matches(&json!({})));
        assert!(!FieldType::Any.matches(&Value::Null));
    }

    #[test]
    fn test_answers_to_is_case_insensitive() {
        let spec = FieldSpec::string("actor_label").alias("ActorName");
        assert!(spec.answers_to("ACTOR_LABEL"));
        assert!(spec.answers_to("actorname"));
        assert!(!spec.answers_to("actor_path"));
    }
}
