//! `manage_level_actors`: spawn, find and edit actors in the open level
//!
//! Every action that targets an existing actor takes exactly one identifier
//! from the `actor` group, tried in this order when several are given:
//! `actor_label`, `actor_path`, `actor_guid`, `actor_tag`.

use serde_json::{Map, Value, json};
use stagehand_core::prelude::*;

use crate::document::{ActorRef, DEFAULT_ACTOR_CLASS, EditorDocument, Transform};

/// Actions understood by `manage_level_actors`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelActorAction {
    Spawn,
    Find,
    List,
    Rename,
    SetTransform,
    Attach,
    Detach,
    Remove,
    AddComponent,
    RemoveComponent,
}

impl ToolAction for LevelActorAction {
    const ALL: &'static [Self] = &[
        Self::Spawn,
        Self::Find,
        Self::List,
        Self::Rename,
        Self::SetTransform,
        Self::Attach,
        Self::Detach,
        Self::Remove,
        Self::AddComponent,
        Self::RemoveComponent,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Spawn => "spawn",
            Self::Find => "find",
            Self::List => "list",
            Self::Rename => "rename",
            Self::SetTransform => "set_transform",
            Self::Attach => "attach",
            Self::Detach => "detach",
            Self::Remove => "remove",
            Self::AddComponent => "add_component",
            Self::RemoveComponent => "remove_component",
        }
    }
}

/// The `manage_level_actors` tool
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelActorsTool;

/// Members of the `actor` identifier group, in precedence order
pub const ACTOR_IDENTIFIERS: [&str; 4] = ["actor_label", "actor_path", "actor_guid", "actor_tag"];

const ACTOR_GROUP: &str = "actor";

fn identifier_fields() -> [FieldSpec; 4] {
    [
        FieldSpec::string("actor_label")
            .aliases(["ActorName", "ActorLabel", "actor_name"])
            .describe("Label shown in the outliner"),
        FieldSpec::string("actor_path").alias("ActorPath"),
        FieldSpec::string("actor_guid").aliases(["ActorGuid", "guid"]),
        FieldSpec::string("actor_tag")
            .aliases(["ActorTag", "tag"])
            .describe("Matches the first actor carrying the tag"),
    ]
}

fn vector_field(name: &str, aliases: &[&str], components: &str) -> FieldSpec {
    FieldSpec::any(name)
        .aliases(aliases.iter().copied())
        .describe(format!("[{components}] or an object with those keys"))
}

fn transform_fields() -> [FieldSpec; 3] {
    [
        vector_field("location", &["position", "translation"], "x, y, z"),
        vector_field("rotation", &["rotator"], "pitch, yaw, roll"),
        vector_field("scale", &["scale3d"], "x, y, z"),
    ]
}

fn component_name() -> FieldSpec {
    FieldSpec::string("component_name")
        .aliases(["ComponentName", "component"])
        .required()
}

/// Actor named by the resolved `actor` identifier
fn target(params: &ResolvedParameters) -> Result<ActorRef<'_>, OperationError> {
    let (field, value) = params.identifier(ACTOR_GROUP).ok_or_else(|| {
        OperationError::new(ErrorCode::InvalidIdentifier, "No actor identifier supplied")
    })?;
    ActorRef::from_field(field, value)
        .ok_or_else(|| OperationError::invalid_value(format!("'{field}' does not name a single actor")))
}

/// Parent named by the resolved `parent` identifier
fn parent(params: &ResolvedParameters) -> Result<ActorRef<'_>, OperationError> {
    match params.identifier("parent") {
        Some(("parent_label", Value::String(label))) => Ok(ActorRef::Label(label)),
        Some(("parent_guid", Value::String(guid))) => Ok(ActorRef::Guid(guid)),
        _ => Err(OperationError::new(ErrorCode::InvalidIdentifier, "No parent identifier supplied")),
    }
}

fn parse_vec3(value: &Value, names: [&str; 3]) -> Option<[f64; 3]> {
    let components: Vec<f64> = match value {
        Value::Array(items) => items.iter().map(Value::as_f64).collect::<Option<_>>()?,
        Value::Object(map) => names
            .iter()
            .map(|name| map.get(*name).and_then(Value::as_f64))
            .collect::<Option<_>>()?,
        _ => return None,
    };
    components.try_into().ok()
}

fn vec3(params: &ResolvedParameters, field: &str) -> Result<Option<[f64; 3]>, OperationError> {
    let names = if field == "rotation" {
        ["pitch", "yaw", "roll"]
    } else {
        ["x", "y", "z"]
    };
    let Some(value) = params.get(field) else {
        return Ok(None);
    };
    parse_vec3(value, names).map(Some).ok_or_else(|| {
        OperationError::invalid_value(format!(
            "'{field}' must be three numbers, got {value}"
        ))
    })
}

fn string_list(params: &ResolvedParameters, field: &str) -> Result<Vec<String>, OperationError> {
    params
        .array(field)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| OperationError::invalid_value(format!("'{field}' must contain strings")))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .unwrap_or_else(|| Ok(Vec::new()))
}

impl Tool<EditorDocument> for LevelActorsTool {
    type Action = LevelActorAction;

    fn name(&self) -> &'static str {
        "manage_level_actors"
    }

    fn description(&self) -> &'static str {
        "Spawn, find, rename, move, attach and remove actors in the open level"
    }

    fn describe(&self, action: LevelActorAction) -> ActionDescriptor {
        let base = ActionDescriptor::new(self.name(), action.name());
        let targeted = |base: ActionDescriptor| {
            base.fields(identifier_fields())
                .one_of(ACTOR_GROUP, ACTOR_IDENTIFIERS, ErrorCode::InvalidIdentifier)
        };

        match action {
            LevelActorAction::Spawn => base
                .summary("Spawn a new actor")
                .field(
                    FieldSpec::string("actor_label")
                        .aliases(["ActorName", "ActorLabel", "actor_name", "label"])
                        .required(),
                )
                .field(
                    FieldSpec::string("actor_class")
                        .aliases(["ActorClass", "class", "class_name"])
                        .default_value(json!(DEFAULT_ACTOR_CLASS)),
                )
                .fields(transform_fields())
                .field(FieldSpec::array("tags").alias("actor_tags")),
            LevelActorAction::Find => targeted(base.summary("Describe one actor")),
            LevelActorAction::List => base
                .summary("List actors, optionally filtered")
                .field(FieldSpec::string("class_filter").aliases(["class", "ClassFilter"]))
                .field(FieldSpec::string("tag_filter").aliases(["tag", "TagFilter"]))
                .field(FieldSpec::string("label_contains").aliases(["LabelContains", "filter"])),
            LevelActorAction::Rename => targeted(base.summary("Change an actor's label")).field(
                FieldSpec::string("new_label")
                    .aliases(["NewLabel", "new_name", "NewName"])
                    .required(),
            ),
            LevelActorAction::SetTransform => {
                targeted(base.summary("Replace location, rotation or scale")).fields(transform_fields())
            }
            LevelActorAction::Attach => targeted(base.summary("Attach an actor to a parent actor"))
                .field(FieldSpec::string("parent_label").aliases(["ParentName", "ParentLabel", "parent"]))
                .field(FieldSpec::string("parent_guid").alias("ParentGuid"))
                .one_of("parent", ["parent_label", "parent_guid"], ErrorCode::MissingProperty),
            LevelActorAction::Detach => targeted(base.summary("Detach an actor from its parent")),
            LevelActorAction::Remove => base
                .summary("Remove one actor, or several by label via actor_labels")
                .fields(identifier_fields())
                .field(FieldSpec::array("actor_labels").aliases(["ActorNames", "ActorLabels"]))
                .one_of(
                    ACTOR_GROUP,
                    ACTOR_IDENTIFIERS.into_iter().chain(["actor_labels"]),
                    ErrorCode::InvalidIdentifier,
                )
                .batch(BatchSpec::listed("actor_labels", "removed", "label")),
            LevelActorAction::AddComponent => targeted(base.summary("Add a component to an actor"))
                .field(component_name())
                .field(
                    FieldSpec::string("component_class")
                        .aliases(["ComponentClass", "component_type"])
                        .default_value(json!("SceneComponent")),
                ),
            LevelActorAction::RemoveComponent => {
                targeted(base.summary("Remove a component from an actor")).field(component_name())
            }
        }
    }

    fn execute(
        &self,
        action: LevelActorAction,
        doc: &mut EditorDocument,
        params: &ResolvedParameters,
    ) -> OperationResult {
        let mut out = Map::new();

        match action {
            LevelActorAction::Spawn => {
                let label = params.require_str("actor_label")?;
                let class = params.str("actor_class").unwrap_or(DEFAULT_ACTOR_CLASS);
                let defaults = Transform::default();
                let transform = Transform {
                    location: vec3(params, "location")?.unwrap_or(defaults.location),
                    rotation: vec3(params, "rotation")?.unwrap_or(defaults.rotation),
                    scale: vec3(params, "scale")?.unwrap_or(defaults.scale),
                };
                let tags = string_list(params, "tags")?;
                let actor = doc.spawn_actor(label, class, transform, &tags)?;
                out.insert("actor".into(), actor.to_json());
                out.insert("message".into(), json!(format!("Spawned {class} '{label}'")));
            }
            LevelActorAction::Find => {
                let actor = doc.actor(target(params)?)?;
                out.insert("actor".into(), actor.to_json());
            }
            LevelActorAction::List => {
                let class = params.str("class_filter");
                let tag = params.str("tag_filter");
                let needle = params.str("label_contains").map(str::to_ascii_lowercase);
                let actors: Vec<Value> = doc
                    .actors()
                    .iter()
                    .filter(|a| class.is_none_or(|c| a.class.eq_ignore_ascii_case(c)))
                    .filter(|a| tag.is_none_or(|t| a.has_tag(t)))
                    .filter(|a| {
                        needle
                            .as_deref()
                            .is_none_or(|n| a.label.to_ascii_lowercase().contains(n))
                    })
                    .map(|a| json!({"label": a.label, "class": a.class, "guid": a.guid}))
                    .collect();
                out.insert("count".into(), json!(actors.len()));
                out.insert("actors".into(), Value::Array(actors));
            }
            LevelActorAction::Rename => {
                let new_label = params.require_str("new_label")?;
                let actor = doc.rename_actor(target(params)?, new_label)?;
                out.insert("actor".into(), actor.to_json());
                out.insert("message".into(), json!(format!("Renamed actor to '{new_label}'")));
            }
            LevelActorAction::SetTransform => {
                let location = vec3(params, "location")?;
                let rotation = vec3(params, "rotation")?;
                let scale = vec3(params, "scale")?;
                if location.is_none() && rotation.is_none() && scale.is_none() {
                    return Err(OperationError::new(
                        ErrorCode::MissingProperty,
                        "Provide at least one of location, rotation or scale",
                    ));
                }
                let actor = doc.set_transform(target(params)?, location, rotation, scale)?;
                out.insert("actor".into(), actor.to_json());
            }
            LevelActorAction::Attach => {
                let actor = doc.attach(target(params)?, parent(params)?)?;
                let label = actor.label.clone();
                out.insert("actor".into(), actor.to_json());
                out.insert("message".into(), json!(format!("Attached '{label}'")));
            }
            LevelActorAction::Detach => {
                let actor = doc.detach(target(params)?)?;
                out.insert("actor".into(), actor.to_json());
            }
            LevelActorAction::Remove => {
                let removed = doc.remove_actor(target(params)?)?;
                out.insert("label".into(), json!(removed.label));
                out.insert("message".into(), json!(format!("Removed actor '{}'", removed.label)));
            }
            LevelActorAction::AddComponent => {
                let name = params.require_str("component_name")?;
                let class = params.str("component_class").unwrap_or("SceneComponent");
                let actor = doc.add_component(target(params)?, name, class)?;
                out.insert("actor".into(), actor.to_json());
            }
            LevelActorAction::RemoveComponent => {
                let name = params.require_str("component_name")?;
                let component = doc.remove_component(target(params)?, name)?;
                out.insert("component_name".into(), json!(component.name));
                out.insert("component_class".into(), json!(component.class));
            }
        }

        Ok(out)
    }

    fn execute_item(
        &self,
        action: LevelActorAction,
        doc: &mut EditorDocument,
        _params: &ResolvedParameters,
        item: &BatchItem,
    ) -> OperationResult {
        if action != LevelActorAction::Remove {
            return Err(OperationError::new(
                ErrorCode::OperationFailed,
                format!("'{}' cannot run per item", action.name()),
            ));
        }
        let label = item
            .value
            .as_str()
            .ok_or_else(|| OperationError::invalid_value("Actor labels must be strings"))?;
        doc.remove_actor(ActorRef::Label(label))?;
        Ok(Map::new())
    }
}
