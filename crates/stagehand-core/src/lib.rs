//! # Stagehand Core
//!
//! Action dispatch and parameter resolution for editor-facing agent tools.
//!
//! Every `manage_X` tool exposes a single entry point taking an `Action` name
//! and a `ParamsJson` payload. This crate owns everything between the wire and
//! the editor:
//!
//! - [`request`] - parse `{Action, ParamsJson}`, where `ParamsJson` may be an
//!   object or a JSON-encoded string
//! - [`alias`] - resolve the many accepted spellings of one parameter
//! - [`validate`] - one-of groups, required fields, confirmation gates, types
//!   and defaults, as a pure function
//! - [`session`] - the editor boundary and the transactional invoker
//! - [`batch`] - per-item execution with partial success
//! - [`envelope`] - the uniform `{success, ...}` response
//! - [`registry`] / [`dispatch`] - typed tool registration and routing
//!
//! ## Example
//!
//! ```ignore
//! use stagehand_core::prelude::*;
//!
//! let registry = ActionRegistry::new().with(MyTool)?;
//! let dispatcher = Dispatcher::new(registry);
//!
//! let response = dispatcher.dispatch(
//!     &mut session,
//!     "manage_data_table",
//!     &json!({"Action": "add_row", "ParamsJson": {"TablePath": "/Game/Items", "row_name": "Sword"}}),
//! );
//! assert!(response.success);
//! ```

pub mod alias;
pub mod batch;
pub mod descriptor;
pub mod dispatch;
pub mod envelope;
pub mod field;
pub mod params;
pub mod registry;
pub mod request;
pub mod session;
pub mod validate;

mod error;

pub use error::{Error, ErrorCode, OperationError, Result, ValidationError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::{BatchItem, BatchReport};
    pub use crate::descriptor::{ActionDescriptor, BatchSpec, BatchStyle, OneOfGroup};
    pub use crate::dispatch::{Dispatcher, RequestStage};
    pub use crate::envelope::ResponseEnvelope;
    pub use crate::field::{FieldSpec, FieldType};
    pub use crate::params::ResolvedParameters;
    pub use crate::registry::{ActionRegistry, Tool, ToolAction};
    pub use crate::request::Request;
    pub use crate::session::{OperationOutput, OperationResult, Session};
    pub use crate::validate::{Diagnostic, Validated};
    pub use crate::{Error, ErrorCode, OperationError, ValidationError};
}
