//! # Stagehand Editor
//!
//! A reference editor for the Stagehand dispatch core: an in-memory
//! [`EditorDocument`] that implements [`Session`](stagehand_core::session::Session),
//! and the built-in tools that operate on it.
//!
//! | Tool | Actions |
//! |---|---|
//! | `manage_data_table` | `create`, `list_rows`, `get_row`, `add_row`, `add_rows`, `update_row`, `rename_row`, `remove_row`, `remove_rows`, `clear_rows` |
//! | `manage_level_actors` | `spawn`, `find`, `list`, `rename`, `set_transform`, `attach`, `detach`, `remove`, `add_component`, `remove_component` |

pub mod data_table;
pub mod document;
pub mod level_actors;

mod error;

use stagehand_core::dispatch::Dispatcher;
use stagehand_core::registry::ActionRegistry;

pub use data_table::{DataTableAction, DataTableTool};
pub use document::{Actor, ActorRef, DataTable, EditorDocument, Row, RowStruct, Transform};
pub use error::{DocumentError, DocumentResult};
pub use level_actors::{LevelActorAction, LevelActorsTool};

/// Registry holding every built-in tool
///
/// # Errors
/// Returns an error if a built-in descriptor is inconsistent.
pub fn builtin_registry() -> stagehand_core::Result<ActionRegistry<EditorDocument>> {
    ActionRegistry::new()
        .with(DataTableTool)?
        .with(LevelActorsTool)
}

/// Dispatcher over [`builtin_registry`]
///
/// # Errors
/// Returns an error if a built-in descriptor is inconsistent.
pub fn builtin_dispatcher() -> stagehand_core::Result<Dispatcher<EditorDocument>> {
    builtin_registry().map(Dispatcher::new)
}
