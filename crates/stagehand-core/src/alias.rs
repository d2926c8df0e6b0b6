//! Parameter alias resolution
//!
//! Callers may spell a parameter several ways (`actor_label`, `ActorName`, ...).
//! Resolution picks a single raw key per field with a fixed precedence:
//!
//! 1. the canonical name,
//! 2. the remaining aliases in ascending case-folded alphabetical order.
//!
//! Keys are matched ASCII case-insensitively; values are never touched. A
//! `null` value counts as absent. When two raw keys fold to the same name the
//! exact-case spelling wins, then the lexicographically smallest key. The
//! outcome depends only on which keys are present, never on their order.

use serde_json::{Map, Value};

use crate::field::FieldSpec;

/// Outcome of resolving one field against the raw parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AliasMatch<'a> {
    /// Canonical field name
    pub field: &'a str,
    /// Raw key that supplied the value
    pub key: &'a str,
    pub value: &'a Value,
    /// Other present keys for the same field that lost on precedence
    pub shadowed: Vec<&'a str>,
}

impl AliasMatch<'_> {
    /// Whether the value came from an alias rather than the canonical name
    pub fn via_alias(&self) -> bool {
        !self.key.eq_ignore_ascii_case(self.field)
    }
}

/// Field names in resolution order: canonical, then aliases alphabetically
pub fn precedence(spec: &FieldSpec) -> Vec<&str> {
    let mut aliases: Vec<&str> = spec
        .aliases
        .iter()
        .map(String::as_str)
        .filter(|alias| !alias.eq_ignore_ascii_case(&spec.name))
        .collect();
    aliases.sort_by_key(|alias| alias.to_ascii_lowercase());
    aliases.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

    let mut order = Vec::with_capacity(aliases.len() + 1);
    order.push(spec.name.as_str());
    order.extend(aliases);
    order
}

/// Raw keys spelling `name` with a non-null value, best first
///
/// The exact-case key leads, the other spellings follow in byte order.
fn spellings<'a>(raw: &'a Map<String, Value>, name: &str) -> Vec<(&'a str, &'a Value)> {
    let mut found: Vec<(&'a str, &'a Value)> = raw
        .iter()
        .filter(|(key, value)| !value.is_null() && key.eq_ignore_ascii_case(name))
        .map(|(key, value)| (key.as_str(), value))
        .collect();
    found.sort_by_key(|&(key, _)| (key != name, key));
    found
}

/// Resolve a field against raw parameters
pub fn resolve_field<'a>(raw: &'a Map<String, Value>, spec: &'a FieldSpec) -> Option<AliasMatch<'a>> {
    let mut winner: Option<(&'a str, &'a Value)> = None;
    let mut shadowed = Vec::new();

    for name in precedence(spec) {
        for (key, value) in spellings(raw, name) {
            if winner.is_none() {
                winner = Some((key, value));
            } else {
                shadowed.push(key);
            }
        }
    }

    winner.map(|(key, value)| AliasMatch {
        field: spec.name.as_str(),
        key,
        value,
        shadowed,
    })
}

/// Raw keys no field in `specs` answers to
pub fn unknown_keys<'a>(raw: &'a Map<String, Value>, specs: &[FieldSpec]) -> Vec<&'a str> {
    raw.keys()
        .map(String::as_str)
        .filter(|key| !specs.iter().any(|spec| spec.answers_to(key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn actor_label() -> FieldSpec {
        FieldSpec::string("actor_label").aliases(["ActorName", "Label", "actor"])
    }

    fn raw(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_precedence_order() {
        let spec = actor_label();
        assert_eq!(precedence(&spec), vec!["actor_label", "actor", "ActorName", "Label"]);
    }

    #[test]
    fn test_each_alias_resolves_alone() {
        let spec = actor_label();
        for key in ["actor_label", "ActorName", "Label", "actor", "ACTORNAME"] {
            let params = raw(json!({ key: "Cube" }));
            let found = resolve_field(&params, &spec);
            assert_eq!(found.map(|m| m.value.clone()), Some(json!("Cube")), "{key}");
        }
    }

    #[test]
    fn test_canonical_wins_and_shadows() {
        let spec = actor_label();
        let params = raw(json!({ "ActorName": "B", "actor_label": "A", "Label": "C" }));
        let found = resolve_field(&params, &spec);
        let found = found.as_ref();
        assert_eq!(found.map(|m| m.key), Some("actor_label"));
        assert_eq!(found.map(|m| m.shadowed.clone()), Some(vec!["ActorName", "Label"]));
    }

    #[test]
    fn test_alphabetical_between_aliases() {
        let spec = actor_label();
        let params = raw(json!({ "Label": "C", "ActorName": "B" }));
        let found = resolve_field(&params, &spec);
        assert_eq!(found.map(|m| m.key), Some("ActorName"));
    }

    #[test]
    fn test_null_is_absent() {
        let spec = actor_label();
        let params = raw(json!({ "actor_label": null, "Label": "C" }));
        let found = resolve_field(&params, &spec);
        assert_eq!(found.map(|m| m.value.clone()), Some(json!("C")));
    }

    #[test]
    fn test_exact_case_preferred_over_folded_duplicate() {
        let spec = actor_label();
        let params = raw(json!({ "ACTOR_LABEL": "upper", "actor_label": "exact" }));
        let found = resolve_field(&params, &spec);
        let found = found.as_ref();
        assert_eq!(found.map(|m| m.value.clone()), Some(json!("exact")));
        assert_eq!(found.map(|m| m.shadowed.clone()), Some(vec!["ACTOR_LABEL"]));
    }

    #[test]
    fn test_folded_duplicates_without_exact_case_are_all_reported() {
        let spec = actor_label();
        let params = raw(json!({ "Actor_Label": "b", "ACTOR_LABEL": "a", "LABEL": "c" }));
        let found = resolve_field(&params, &spec);
        let found = found.as_ref();
        assert_eq!(found.map(|m| m.key), Some("ACTOR_LABEL"));
        assert_eq!(found.map(|m| m.shadowed.clone()), Some(vec!["Actor_Label", "LABEL"]));
    }

    #[test]
    fn test_unknown_keys() {
        let specs = vec![actor_label()];
        let params = raw(json!({ "actorname": "x", "colour": "red" }));
        assert_eq!(unknown_keys(&params, &specs), vec!["colour"]);
    }
}
