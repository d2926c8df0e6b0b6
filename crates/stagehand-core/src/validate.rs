//! Validation engine
//!
//! Turns raw request parameters into [`ResolvedParameters`] for one action, or
//! rejects them with a protocol-level [`ValidationError`]. Validation is a pure
//! function of the descriptor and the raw parameters: it touches no editor
//! state, reads no clock, and returns the same answer for the same input.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::alias::{resolve_field, unknown_keys, AliasMatch};
use crate::descriptor::{ActionDescriptor, CONFIRM_FIELD};
use crate::error::{ErrorCode, ValidationError};
use crate::field::{json_type_name, FieldSpec};
use crate::params::ResolvedParameters;

/// Non-fatal observations made while validating
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Several spellings of one field were supplied; `used` won on precedence
    AliasShadowed {
        field: String,
        used: String,
        ignored: Vec<String>,
    },
    /// Several members of a one-of group were supplied; `used` won on precedence
    AmbiguousIdentifier {
        group: String,
        used: String,
        ignored: Vec<String>,
    },
    /// A raw key that no field or alias of the action answers to
    UnknownParameter { key: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AliasShadowed {
                field,
                used,
                ignored,
            } => write!(
                f,
                "'{field}' was supplied more than once; using '{used}', ignoring {}",
                ignored.join(", ")
            ),
            Self::AmbiguousIdentifier {
                group,
                used,
                ignored,
            } => write!(
                f,
                "More than one {group} identifier supplied; using '{used}', ignoring {}",
                ignored.join(", ")
            ),
            Self::UnknownParameter { key } => write!(f, "Unknown parameter '{key}' was ignored"),
        }
    }
}

/// Successful validation result
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub params: ResolvedParameters,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate raw parameters against an action descriptor
///
/// Checks run in a fixed order: one-of groups, required fields, the
/// confirmation gate, value types, then defaults.
pub fn validate(
    descriptor: &ActionDescriptor,
    raw: &Map<String, Value>,
) -> Result<Validated, ValidationError> {
    let mut diagnostics = Vec::new();

    let resolved: Vec<(&FieldSpec, Option<AliasMatch<'_>>)> = descriptor
        .fields
        .iter()
        .map(|spec| (spec, resolve_field(raw, spec)))
        .collect();

    for found in resolved.iter().filter_map(|(_, m)| m.as_ref()) {
        if !found.shadowed.is_empty() {
            diagnostics.push(Diagnostic::AliasShadowed {
                field: found.field.to_string(),
                used: found.key.to_string(),
                ignored: found.shadowed.iter().map(|k| (*k).to_string()).collect(),
            });
        }
    }

    let lookup = |name: &str| {
        resolved
            .iter()
            .find(|(spec, _)| spec.name == name)
            .and_then(|(_, m)| m.as_ref())
    };

    // One-of groups: exactly one member must be present.
    let mut params = ResolvedParameters::new();
    let mut losers: Vec<&str> = Vec::new();
    for group in &descriptor.one_of {
        let present: Vec<&AliasMatch<'_>> = group
            .members
            .iter()
            .filter_map(|member| lookup(member))
            .collect();

        let Some(winner) = present.first() else {
            return Err(ValidationError::new(
                group.missing_code,
                Some(&group.name),
                format!(
                    "Exactly one of {} is required to identify the {}",
                    group.members.join(", "),
                    group.name
                ),
            ));
        };

        if present.len() > 1 {
            diagnostics.push(Diagnostic::AmbiguousIdentifier {
                group: group.name.clone(),
                used: winner.field.to_string(),
                ignored: present[1..].iter().map(|m| m.field.to_string()).collect(),
            });
            losers.extend(present[1..].iter().map(|m| m.field));
        }
        params.set_identifier(&group.name, winner.field);
    }

    // Required fields outside any group.
    for (spec, found) in &resolved {
        if spec.required && found.is_none() && descriptor.group_of(&spec.name).is_none() {
            return Err(ValidationError::new(
                ErrorCode::MissingProperty,
                Some(&spec.name),
                format!("Missing required property '{}'", spec.name),
            ));
        }
    }

    // Destructive actions need an explicit confirm=true.
    if descriptor.requires_confirmation {
        match lookup(CONFIRM_FIELD).map(|m| m.value) {
            None => {
                return Err(ValidationError::new(
                    ErrorCode::MissingProperty,
                    Some(CONFIRM_FIELD),
                    format!(
                        "'{}' is destructive and requires confirm=true",
                        descriptor.action
                    ),
                ));
            }
            Some(Value::Bool(true)) => {}
            Some(other) => {
                return Err(ValidationError::new(
                    ErrorCode::InvalidValue,
                    Some(CONFIRM_FIELD),
                    format!(
                        "'{}' requires confirm=true, got {other}",
                        descriptor.action
                    ),
                ));
            }
        }
    }

    // Type checks, then defaults.
    for (spec, found) in &resolved {
        if losers.contains(&spec.name.as_str()) {
            continue;
        }
        match found {
            Some(found) => {
                if !spec.ty.matches(found.value) {
                    return Err(ValidationError::new(
                        ErrorCode::InvalidValue,
                        Some(&spec.name),
                        format!(
                            "Parameter '{}' must be of type {}, got {}",
                            spec.name,
                            spec.ty,
                            json_type_name(found.value)
                        ),
                    ));
                }
                params.insert(spec.name.clone(), found.value.clone());
            }
            None => {
                if let Some(default) = &spec.default {
                    params.insert(spec.name.clone(), default.clone());
                }
            }
        }
    }

    let mut unknown = unknown_keys(raw, &descriptor.fields);
    unknown.sort_unstable();
    diagnostics.extend(unknown.into_iter().map(|key| Diagnostic::UnknownParameter {
        key: key.to_string(),
    }));

    Ok(Validated {
        params,
        diagnostics,
    })
}
