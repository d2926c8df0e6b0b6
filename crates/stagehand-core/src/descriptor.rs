//! Action descriptors
//!
//! An [`ActionDescriptor`] is the declarative contract of one `(tool, action)`
//! pair: which fields exist, which are required, which identifier fields are
//! mutually substitutable, whether the action is destructive, and whether it
//! operates over a collection. Descriptors are built once when a tool is
//! registered and never change afterwards.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Error, ErrorCode, Result};
use crate::field::FieldSpec;

/// Field name of the confirmation flag on destructive actions
pub const CONFIRM_FIELD: &str = "confirm";

/// A set of identifier fields where exactly one must be supplied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneOfGroup {
    pub name: String,
    /// Member fields, in precedence order
    pub members: Vec<String>,
    /// Code reported when no member is present
    pub missing_code: ErrorCode,
}

/// How a batch result is laid out in the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStyle {
    /// `"<succeeded>": [key, ...]`, `"<failed>": {key: reason}`
    Keyed,
    /// `"<succeeded>": [{<key_field>, success, ..}]`, `"<failed>": [...]`, plus counts
    Listed,
}

/// Declares that an action runs once per item of a collection field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSpec {
    /// Field holding the collection
    pub items_field: String,
    /// Envelope key listing successful items
    pub succeeded: String,
    /// Envelope key listing failed items
    pub failed: String,
    /// Per-item key name in [`BatchStyle::Listed`] entries
    pub key_field: String,
    pub style: BatchStyle,
}

impl BatchSpec {
    /// Keyed layout, e.g. `added_rows` / `failed_rows`
    pub fn keyed(
        items_field: impl Into<String>,
        succeeded: impl Into<String>,
        failed: impl Into<String>,
    ) -> Self {
        Self {
            items_field: items_field.into(),
            succeeded: succeeded.into(),
            failed: failed.into(),
            key_field: "key".to_string(),
            style: BatchStyle::Keyed,
        }
    }

    /// Listed layout, e.g. `removed` / `failed` entries carrying `label`
    pub fn listed(
        items_field: impl Into<String>,
        succeeded: impl Into<String>,
        key_field: impl Into<String>,
    ) -> Self {
        Self {
            items_field: items_field.into(),
            succeeded: succeeded.into(),
            failed: "failed".to_string(),
            key_field: key_field.into(),
            style: BatchStyle::Listed,
        }
    }
}

/// Declarative contract of one action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDescriptor {
    pub tool: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub fields: Vec<FieldSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<OneOfGroup>,
    pub requires_confirmation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchSpec>,
}

impl ActionDescriptor {
    pub fn new(tool: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            action: action.into(),
            summary: None,
            fields: Vec::new(),
            one_of: Vec::new(),
            requires_confirmation: false,
            batch: None,
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields<I: IntoIterator<Item = FieldSpec>>(mut self, fields: I) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Declare that exactly one of `members` must be present
    ///
    /// Member order is the precedence used when several are supplied.
    pub fn one_of<I, M>(mut self, name: impl Into<String>, members: I, missing_code: ErrorCode) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.one_of.push(OneOfGroup {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
            missing_code,
        });
        self
    }

    /// Gate the action behind `confirm: true`
    pub fn requires_confirmation(mut self) -> Self {
        if !self.fields.iter().any(|f| f.name == CONFIRM_FIELD) {
            self.fields.push(
                FieldSpec::bool(CONFIRM_FIELD).describe("Must be true to run this destructive action"),
            );
        }
        self.requires_confirmation = true;
        self
    }

    pub fn batch(mut self, spec: BatchSpec) -> Self {
        self.batch = Some(spec);
        self
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Group a field belongs to, if any
    pub fn group_of(&self, field: &str) -> Option<&OneOfGroup> {
        self.one_of
            .iter()
            .find(|group| group.members.iter().any(|m| m == field))
    }

    /// Check internal consistency
    ///
    /// Names and aliases must be unique (case-insensitive) across the whole
    /// descriptor, and one-of groups and batch specs must point at declared
    /// fields.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            for name in field.all_names() {
                if !seen.insert(name.to_ascii_lowercase()) {
                    return Err(Error::DuplicateAlias {
                        tool: self.tool.clone(),
                        action: self.action.clone(),
                        alias: name.to_string(),
                    });
                }
            }
        }

        for group in &self.one_of {
            if group.members.is_empty() {
                return Err(Error::EmptyGroup {
                    tool: self.tool.clone(),
                    action: self.action.clone(),
                    group: group.name.clone(),
                });
            }
            for member in &group.members {
                self.require_declared(member)?;
            }
        }

        if let Some(batch) = &self.batch {
            self.require_declared(&batch.items_field)?;
        }

        Ok(())
    }

    fn require_declared(&self, field: &str) -> Result<()> {
        if self.field_spec(field).is_some() {
            Ok(())
        } else {
            Err(Error::UndeclaredField {
                tool: self.tool.clone(),
                action: self.action.clone(),
                field: field.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_adds_field_once() {
        let descriptor = ActionDescriptor::new("t", "clear")
            .requires_confirmation()
            .requires_confirmation();
        let confirms = descriptor
            .fields
            .iter()
            .filter(|f| f.name == CONFIRM_FIELD)
            .count();
        assert_eq!(confirms, 1);
        assert!(descriptor.check().is_ok());
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let descriptor = ActionDescriptor::new("t", "a")
            .field(FieldSpec::string("actor_label").alias("Name"))
            .field(FieldSpec::string("name"));
        assert!(matches!(descriptor.check(), Err(Error::DuplicateAlias { .. })));
    }

    #[test]
    fn test_group_must_reference_declared_fields() {
        let descriptor = ActionDescriptor::new("t", "a")
            .field(FieldSpec::string("actor_label"))
            .one_of("actor", ["actor_label", "actor_guid"], ErrorCode::InvalidIdentifier);
        assert!(matches!(
            descriptor.check(),
            Err(Error::UndeclaredField { ref field, .. }) if field == "actor_guid"
        ));
    }

    #[test]
    fn test_batch_field_must_be_declared() {
        let descriptor = ActionDescriptor::new("t", "a").batch(BatchSpec::keyed("rows", "added", "failed"));
        assert!(descriptor.check().is_err());
    }
}
