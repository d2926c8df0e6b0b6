//! In-memory editor document
//!
//! Holds the state the built-in tools operate on: row structs, data tables and
//! the actors of a single persistent level. The document implements
//! [`Session`]: every transaction snapshots the mutable contents and a rollback
//! restores the snapshot, so a failed Operation never leaves partial edits.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use serde_json::{Map, Value, json};
use stagehand_core::session::Session;

use crate::error::{DocumentError, DocumentResult};

/// Object path prefix shared by every actor in the level
pub const LEVEL_PATH: &str = "/Game/Maps/Untitled.Untitled:PersistentLevel";

/// Class used when `spawn` is not given one
pub const DEFAULT_ACTOR_CLASS: &str = "StaticMeshActor";

/// Committed transaction labels kept for inspection
pub const MAX_HISTORY: usize = 100;

// ============================================================================
// Row structs and data tables
// ============================================================================

/// Schema of the rows stored in a data table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowStruct {
    pub path: String,
    /// Field name -> default value, in declaration order
    pub fields: Vec<(String, Value)>,
}

impl RowStruct {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, default: Value) -> Self {
        self.fields.push((name.into(), default));
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// A row with every field at its default
    pub fn default_row(&self) -> Map<String, Value> {
        self.fields.iter().cloned().collect()
    }
}

/// A named row of a data table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub name: String,
    pub values: Map<String, Value>,
}

/// A data table asset: a row struct plus ordered rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTable {
    pub path: String,
    pub row_struct: String,
    rows: Vec<Row>,
}

impl DataTable {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn row_names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }

    pub fn find_row(&self, name: &str) -> DocumentResult<&Row> {
        self.row_index(name).map(|index| &self.rows[index])
    }

    fn row_index(&self, name: &str) -> DocumentResult<usize> {
        self.rows
            .iter()
            .position(|row| row.name == name)
            .ok_or_else(|| DocumentError::RowNotFound {
                table: self.path.clone(),
                row: name.to_string(),
            })
    }
}

// ============================================================================
// Actors
// ============================================================================

/// Location, rotation (pitch, yaw, roll in degrees) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub location: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

/// A component attached to an actor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    pub class: String,
}

/// An actor placed in the level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub label: String,
    pub guid: String,
    pub class: String,
    pub tags: Vec<String>,
    pub transform: Transform,
    /// Guid of the parent actor
    pub parent: Option<String>,
    pub components: Vec<Component>,
}

impl Actor {
    /// Full object path, derived from the label
    pub fn path(&self) -> String {
        format!("{LEVEL_PATH}.{}", self.label)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// JSON description returned by actor actions
    pub fn to_json(&self) -> Value {
        json!({
            "label": self.label,
            "path": self.path(),
            "guid": self.guid,
            "class": self.class,
            "tags": self.tags,
            "location": self.transform.location,
            "rotation": self.transform.rotation,
            "scale": self.transform.scale,
            "parent": self.parent,
            "components": self.components,
        })
    }
}

/// One way of naming an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRef<'a> {
    Label(&'a str),
    Path(&'a str),
    Guid(&'a str),
    Tag(&'a str),
}

impl<'a> ActorRef<'a> {
    /// Build from a resolved identifier field and its value
    pub fn from_field(field: &str, value: &'a Value) -> Option<Self> {
        let value = value.as_str()?;
        match field {
            "actor_label" => Some(Self::Label(value)),
            "actor_path" => Some(Self::Path(value)),
            "actor_guid" => Some(Self::Guid(value)),
            "actor_tag" => Some(Self::Tag(value)),
            _ => None,
        }
    }

    fn matches(self, actor: &Actor) -> bool {
        match self {
            Self::Label(label) => actor.label.eq_ignore_ascii_case(label),
            Self::Path(path) => actor.path().eq_ignore_ascii_case(path),
            Self::Guid(guid) => actor.guid.eq_ignore_ascii_case(guid),
            Self::Tag(tag) => actor.has_tag(tag),
        }
    }
}

impl std::fmt::Display for ActorRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Label(v) => write!(f, "label '{v}'"),
            Self::Path(v) => write!(f, "path '{v}'"),
            Self::Guid(v) => write!(f, "guid '{v}'"),
            Self::Tag(v) => write!(f, "tag '{v}'"),
        }
    }
}

// ============================================================================
// Document
// ============================================================================

/// Everything a transaction can change
#[derive(Debug, Clone, Default, PartialEq)]
struct Contents {
    tables: BTreeMap<String, DataTable>,
    actors: Vec<Actor>,
    next_id: u64,
}

/// The editor state behind the built-in tools
#[derive(Debug, Clone, Default)]
pub struct EditorDocument {
    contents: Contents,
    structs: BTreeMap<String, RowStruct>,
    /// Open transactions, innermost last, each with the snapshot taken when it began
    open: Vec<(String, Contents)>,
    /// Labels of the most recent committed top-level transactions
    history: VecDeque<String>,
    /// Top-level transactions committed since the document was created
    committed: usize,
}

impl EditorDocument {
    /// Empty document with no row structs
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with the stock row structs, a sample table and a few actors
    pub fn with_demo_content() -> Self {
        let mut doc = Self::new();
        doc.register_struct(
            RowStruct::new("/Script/Game.ItemRow")
                .field("display_name", json!(""))
                .field("damage", json!(0))
                .field("weight", json!(0.0))
                .field("rarity", json!("Common")),
        );
        doc.register_struct(
            RowStruct::new("/Script/Game.EnemyRow")
                .field("health", json!(100))
                .field("speed", json!(600.0))
                .field("faction", json!("Neutral")),
        );

        if let Err(e) = doc.seed_demo() {
            tracing::warn!(error = %e, "Failed to seed demo content");
        }

        doc.clear_history();
        doc
    }

    fn seed_demo(&mut self) -> DocumentResult<()> {
        let items = "/Game/Data/DT_Items";
        self.create_table(items, "/Script/Game.ItemRow")?;
        self.add_row(items, "Sword", object(json!({"display_name": "Iron Sword", "damage": 12, "weight": 3.5})))?;
        self.add_row(items, "Shield", object(json!({"display_name": "Oak Shield", "weight": 5.0, "rarity": "Uncommon"})))?;

        let floor = Transform {
            scale: [10.0, 10.0, 1.0],
            ..Transform::default()
        };
        let start = Transform {
            location: [0.0, 0.0, 100.0],
            ..Transform::default()
        };
        let sun = Transform {
            rotation: [-45.0, 30.0, 0.0],
            ..Transform::default()
        };
        self.spawn_actor("Floor", DEFAULT_ACTOR_CLASS, floor, &[])?;
        self.spawn_actor("PlayerStart", "PlayerStart", start, &["Spawn".to_string()])?;
        self.spawn_actor("Sun", "DirectionalLight", sun, &["Lighting".to_string()])?;
        Ok(())
    }

    /// Make a row struct available to `create`
    pub fn register_struct(&mut self, row_struct: RowStruct) {
        self.structs.insert(row_struct.path.clone(), row_struct);
    }

    pub fn row_struct(&self, path: &str) -> Option<&RowStruct> {
        self.structs.get(path)
    }

    pub fn struct_paths(&self) -> Vec<&str> {
        self.structs.keys().map(String::as_str).collect()
    }

    /// Labels of the last [`MAX_HISTORY`] committed transactions, oldest first
    pub fn history(&self) -> &VecDeque<String> {
        &self.history
    }

    /// Number of top-level transactions committed so far
    pub fn committed_count(&self) -> usize {
        self.committed
    }

    fn clear_history(&mut self) {
        self.history.clear();
        self.committed = 0;
    }

    /// Whether a transaction is currently open
    pub fn in_transaction(&self) -> bool {
        !self.open.is_empty()
    }

    // ------------------------------------------------------------------------
    // Data tables
    // ------------------------------------------------------------------------

    pub fn tables(&self) -> impl Iterator<Item = &DataTable> {
        self.contents.tables.values()
    }

    pub fn table(&self, path: &str) -> DocumentResult<&DataTable> {
        self.contents
            .tables
            .get(path)
            .ok_or_else(|| DocumentError::TableNotFound(path.to_string()))
    }

    fn table_mut(&mut self, path: &str) -> DocumentResult<&mut DataTable> {
        self.contents
            .tables
            .get_mut(path)
            .ok_or_else(|| DocumentError::TableNotFound(path.to_string()))
    }

    pub fn create_table(&mut self, path: &str, row_struct: &str) -> DocumentResult<&DataTable> {
        if !self.structs.contains_key(row_struct) {
            return Err(DocumentError::StructNotFound(row_struct.to_string()));
        }
        if self.contents.tables.contains_key(path) {
            return Err(DocumentError::TableExists(path.to_string()));
        }
        let table = DataTable {
            path: path.to_string(),
            row_struct: row_struct.to_string(),
            rows: Vec::new(),
        };
        Ok(self.contents.tables.entry(path.to_string()).or_insert(table))
    }

    /// Check `data` against the table's row struct
    fn check_row_data(&self, table: &DataTable, data: &Map<String, Value>) -> DocumentResult<()> {
        let Some(row_struct) = self.structs.get(&table.row_struct) else {
            return Ok(());
        };
        match data.keys().find(|key| !row_struct.has_field(key)) {
            Some(unknown) => Err(DocumentError::UnknownRowField {
                field: unknown.clone(),
                row_struct: row_struct.path.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Add a row; fields missing from `data` take the struct defaults
    pub fn add_row(&mut self, table_path: &str, name: &str, data: Map<String, Value>) -> DocumentResult<&Row> {
        let table = self.table(table_path)?;
        if name.trim().is_empty() {
            return Err(DocumentError::InvalidRowName("Row name cannot be empty".to_string()));
        }
        if table.row(name).is_some() {
            return Err(DocumentError::RowExists(name.to_string()));
        }
        self.check_row_data(table, &data)?;
        let mut values = self
            .structs
            .get(&table.row_struct)
            .map(RowStruct::default_row)
            .unwrap_or_default();
        values.extend(data);

        let table = self.table_mut(table_path)?;
        table.rows.push(Row {
            name: name.to_string(),
            values,
        });
        let index = table.rows.len() - 1;
        Ok(&table.rows[index])
    }

    /// Merge `data` into an existing row
    pub fn update_row(&mut self, table_path: &str, name: &str, data: &Map<String, Value>) -> DocumentResult<&Row> {
        let table = self.table(table_path)?;
        let index = table.row_index(name)?;
        self.check_row_data(table, data)?;

        let row = &mut self.table_mut(table_path)?.rows[index];
        row.values.extend(data.clone());
        Ok(row)
    }

    pub fn rename_row(&mut self, table_path: &str, name: &str, new_name: &str) -> DocumentResult<()> {
        let table = self.table(table_path)?;
        let index = table.row_index(name)?;
        if new_name.trim().is_empty() {
            return Err(DocumentError::RenameFailed("New row name cannot be empty".to_string()));
        }
        if new_name != name && table.row(new_name).is_some() {
            return Err(DocumentError::RenameFailed(format!(
                "A row named '{new_name}' already exists"
            )));
        }
        self.table_mut(table_path)?.rows[index].name = new_name.to_string();
        Ok(())
    }

    pub fn remove_row(&mut self, table_path: &str, name: &str) -> DocumentResult<Row> {
        let table = self.table_mut(table_path)?;
        let index = table.row_index(name)?;
        Ok(table.rows.remove(index))
    }

    /// Remove every row, returning how many there were
    pub fn clear_rows(&mut self, table_path: &str) -> DocumentResult<usize> {
        let table = self.table_mut(table_path)?;
        let count = table.rows.len();
        table.rows.clear();
        Ok(count)
    }

    // ------------------------------------------------------------------------
    // Actors
    // ------------------------------------------------------------------------

    /// Actors in spawn order
    pub fn actors(&self) -> &[Actor] {
        &self.contents.actors
    }

    fn actor_index(&self, actor: ActorRef<'_>) -> DocumentResult<usize> {
        self.contents
            .actors
            .iter()
            .position(|a| actor.matches(a))
            .ok_or_else(|| DocumentError::ActorNotFound(actor.to_string()))
    }

    pub fn actor(&self, actor: ActorRef<'_>) -> DocumentResult<&Actor> {
        let index = self.actor_index(actor)?;
        Ok(&self.contents.actors[index])
    }

    fn actor_mut(&mut self, actor: ActorRef<'_>) -> DocumentResult<&mut Actor> {
        let index = self.actor_index(actor)?;
        Ok(&mut self.contents.actors[index])
    }

    fn label_taken(&self, label: &str) -> bool {
        self.contents
            .actors
            .iter()
            .any(|a| a.label.eq_ignore_ascii_case(label))
    }

    pub fn spawn_actor(
        &mut self,
        label: &str,
        class: &str,
        transform: Transform,
        tags: &[String],
    ) -> DocumentResult<&Actor> {
        if label.trim().is_empty() {
            return Err(DocumentError::InvalidLabel("Actor label cannot be empty".to_string()));
        }
        if self.label_taken(label) {
            return Err(DocumentError::ActorExists(label.to_string()));
        }

        self.contents.next_id += 1;
        let guid = format!("{:032X}", u128::from(self.contents.next_id) * 0x9E37_79B9_7F4A_7C15);
        self.contents.actors.push(Actor {
            label: label.to_string(),
            guid,
            class: class.to_string(),
            tags: tags.to_vec(),
            transform,
            parent: None,
            components: vec![Component {
                name: "DefaultSceneRoot".to_string(),
                class: "SceneComponent".to_string(),
            }],
        });
        let index = self.contents.actors.len() - 1;
        Ok(&self.contents.actors[index])
    }

    pub fn rename_actor(&mut self, actor: ActorRef<'_>, new_label: &str) -> DocumentResult<&Actor> {
        let index = self.actor_index(actor)?;
        if new_label.trim().is_empty() {
            return Err(DocumentError::RenameFailed("New label cannot be empty".to_string()));
        }
        let current = &self.contents.actors[index].label;
        if !current.eq_ignore_ascii_case(new_label) && self.label_taken(new_label) {
            return Err(DocumentError::RenameFailed(format!(
                "An actor labelled '{new_label}' already exists"
            )));
        }
        let target = &mut self.contents.actors[index];
        target.label = new_label.to_string();
        Ok(target)
    }

    /// Replace the parts of the transform that are given
    pub fn set_transform(
        &mut self,
        actor: ActorRef<'_>,
        location: Option<[f64; 3]>,
        rotation: Option<[f64; 3]>,
        scale: Option<[f64; 3]>,
    ) -> DocumentResult<&Actor> {
        let target = self.actor_mut(actor)?;
        if let Some(location) = location {
            target.transform.location = location;
        }
        if let Some(rotation) = rotation {
            target.transform.rotation = rotation;
        }
        if let Some(scale) = scale {
            target.transform.scale = scale;
        }
        Ok(target)
    }

    /// Attach `child` under `parent`, rejecting self-attachment and cycles
    pub fn attach(&mut self, child: ActorRef<'_>, parent: ActorRef<'_>) -> DocumentResult<&Actor> {
        let child_index = self.actor_index(child)?;
        let parent_index = self.actor_index(parent)?;
        let child_label = self.contents.actors[child_index].label.clone();
        let parent_label = self.contents.actors[parent_index].label.clone();

        if child_index == parent_index {
            return Err(DocumentError::AttachFailed(format!(
                "Cannot attach '{child_label}' to itself"
            )));
        }

        let child_guid = self.contents.actors[child_index].guid.clone();
        let mut cursor = Some(self.contents.actors[parent_index].guid.clone());
        while let Some(guid) = cursor {
            if guid == child_guid {
                return Err(DocumentError::AttachFailed(format!(
                    "Attaching '{child_label}' to '{parent_label}' would create a cycle"
                )));
            }
            cursor = self
                .contents
                .actors
                .iter()
                .find(|a| a.guid == guid)
                .and_then(|a| a.parent.clone());
        }

        let parent_guid = self.contents.actors[parent_index].guid.clone();
        let target = &mut self.contents.actors[child_index];
        target.parent = Some(parent_guid);
        Ok(target)
    }

    pub fn detach(&mut self, actor: ActorRef<'_>) -> DocumentResult<&Actor> {
        let target = self.actor_mut(actor)?;
        if target.parent.take().is_none() {
            return Err(DocumentError::DetachFailed(format!(
                "'{}' is not attached to a parent",
                target.label
            )));
        }
        Ok(target)
    }

    /// Remove an actor; its children are detached, not removed
    pub fn remove_actor(&mut self, actor: ActorRef<'_>) -> DocumentResult<Actor> {
        let index = self.actor_index(actor)?;
        let removed = self.contents.actors.remove(index);
        for other in &mut self.contents.actors {
            if other.parent.as_deref() == Some(removed.guid.as_str()) {
                other.parent = None;
            }
        }
        Ok(removed)
    }

    pub fn add_component(&mut self, actor: ActorRef<'_>, name: &str, class: &str) -> DocumentResult<&Actor> {
        let target = self.actor_mut(actor)?;
        if target.components.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(DocumentError::ComponentExists {
                actor: target.label.clone(),
                component: name.to_string(),
            });
        }
        target.components.push(Component {
            name: name.to_string(),
            class: class.to_string(),
        });
        Ok(target)
    }

    pub fn remove_component(&mut self, actor: ActorRef<'_>, name: &str) -> DocumentResult<Component> {
        let target = self.actor_mut(actor)?;
        let index = target
            .components
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DocumentError::ComponentNotFound {
                actor: target.label.clone(),
                component: name.to_string(),
            })?;
        Ok(target.components.remove(index))
    }
}

/// Unwrap a JSON object literal, treating anything else as empty
fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl Session for EditorDocument {
    fn begin_transaction(&mut self, label: &str) {
        self.open.push((label.to_string(), self.contents.clone()));
    }

    fn commit(&mut self) {
        let Some((label, _)) = self.open.pop() else {
            return;
        };
        if self.open.is_empty() {
            if self.history.len() == MAX_HISTORY {
                self.history.pop_front();
            }
            self.history.push_back(label);
            self.committed += 1;
        }
    }

    fn rollback(&mut self) {
        if let Some((label, snapshot)) = self.open.pop() {
            tracing::debug!(transaction = %label, "Restoring snapshot");
            self.contents = snapshot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items_doc() -> EditorDocument {
        let mut doc = EditorDocument::with_demo_content();
        assert!(doc.table("/Game/Data/DT_Items").is_ok());
        doc.clear_history();
        doc
    }

    #[test]
    fn test_demo_content() {
        let doc = EditorDocument::with_demo_content();
        let table = doc.table("/Game/Data/DT_Items");
        assert_eq!(table.map(DataTable::row_names).ok(), Some(vec!["Sword", "Shield"]));
        assert_eq!(doc.actors().len(), 3);
        assert!(doc.history().is_empty());
    }

    #[test]
    fn test_add_row_fills_defaults() {
        let mut doc = items_doc();
        let row = doc.add_row("/Game/Data/DT_Items", "Axe", object(json!({"damage": 20})));
        let Ok(row) = row else {
            panic!("add_row failed");
        };
        assert_eq!(row.values["damage"], json!(20));
        assert_eq!(row.values["rarity"], json!("Common"));
    }

    #[test]
    fn test_add_row_rejects_unknown_field() {
        let mut doc = items_doc();
        let result = doc.add_row("/Game/Data/DT_Items", "Axe", object(json!({"colour": "red"})));
        assert!(matches!(result, Err(DocumentError::UnknownRowField { .. })));
    }

    #[test]
    fn test_rename_row_conflict() {
        let mut doc = items_doc();
        let result = doc.rename_row("/Game/Data/DT_Items", "Sword", "Shield");
        assert!(matches!(result, Err(DocumentError::RenameFailed(_))));
        assert!(doc.rename_row("/Game/Data/DT_Items", "Sword", "Blade").is_ok());
    }

    #[test]
    fn test_actor_lookup_by_every_ref() {
        let doc = items_doc();
        let Ok(sun) = doc.actor(ActorRef::Label("sun")) else {
            panic!("sun missing");
        };
        let path = sun.path();
        let guid = sun.guid.clone();

        assert_eq!(doc.actor(ActorRef::Path(&path)).map(|a| a.label.as_str()).ok(), Some("Sun"));
        assert_eq!(doc.actor(ActorRef::Guid(&guid)).map(|a| a.label.as_str()).ok(), Some("Sun"));
        assert_eq!(doc.actor(ActorRef::Tag("lighting")).map(|a| a.label.as_str()).ok(), Some("Sun"));
        assert!(matches!(
            doc.actor(ActorRef::Label("Moon")),
            Err(DocumentError::ActorNotFound(_))
        ));
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut doc = items_doc();
        assert!(doc.attach(ActorRef::Label("PlayerStart"), ActorRef::Label("Floor")).is_ok());
        let result = doc.attach(ActorRef::Label("Floor"), ActorRef::Label("PlayerStart"));
        assert!(matches!(result, Err(DocumentError::AttachFailed(_))));
        let result = doc.attach(ActorRef::Label("Floor"), ActorRef::Label("Floor"));
        assert!(matches!(result, Err(DocumentError::AttachFailed(_))));
    }

    #[test]
    fn test_remove_parent_detaches_children() {
        let mut doc = items_doc();
        assert!(doc.attach(ActorRef::Label("PlayerStart"), ActorRef::Label("Floor")).is_ok());
        assert!(doc.remove_actor(ActorRef::Label("Floor")).is_ok());
        let child = doc.actor(ActorRef::Label("PlayerStart"));
        assert_eq!(child.map(|a| a.parent.clone()).ok(), Some(None));
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut doc = items_doc();
        doc.begin_transaction("test");
        assert!(doc.clear_rows("/Game/Data/DT_Items").is_ok());
        assert!(doc.spawn_actor("Tmp", DEFAULT_ACTOR_CLASS, Transform::default(), &[]).is_ok());
        doc.rollback();

        assert_eq!(doc.table("/Game/Data/DT_Items").map(|t| t.rows().len()).ok(), Some(2));
        assert!(doc.actor(ActorRef::Label("Tmp")).is_err());
        assert!(doc.history().is_empty());
        assert!(!doc.in_transaction());
    }

    #[test]
    fn test_nested_commit_records_outermost_only() {
        let mut doc = items_doc();
        doc.begin_transaction("outer");
        doc.begin_transaction("inner");
        doc.commit();
        doc.commit();
        assert_eq!(*doc.history(), ["outer".to_string()]);
        assert_eq!(doc.committed_count(), 1);
    }

    #[test]
    fn test_history_is_bounded_but_count_keeps_rising() {
        let mut doc = items_doc();
        for i in 0..MAX_HISTORY + 5 {
            doc.begin_transaction(&format!("edit {i}"));
            doc.commit();
        }

        assert_eq!(doc.history().len(), MAX_HISTORY);
        assert_eq!(doc.committed_count(), MAX_HISTORY + 5);
        assert_eq!(doc.history().front().map(String::as_str), Some("edit 5"));
        assert_eq!(
            doc.history().back().map(String::as_str),
            Some(format!("edit {}", MAX_HISTORY + 4).as_str())
        );
    }
}
