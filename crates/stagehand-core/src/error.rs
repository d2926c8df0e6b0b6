//! Error types for Stagehand
//!
//! Two families live here: registration errors ([`Error`]), which are bugs in
//! how a tool declares its actions, and wire-level error codes ([`ErrorCode`])
//! that travel back to the caller inside a response envelope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using Stagehand's registration Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or registering action descriptors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The same (tool, action) pair was registered twice
    #[error("Action '{action}' is already registered for tool '{tool}'")]
    DuplicateAction { tool: String, action: String },

    /// A tool with this name is already registered
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    /// Two fields of one descriptor claim the same name or alias
    #[error("Field name or alias '{alias}' is declared twice in '{tool}.{action}'")]
    DuplicateAlias {
        tool: String,
        action: String,
        alias: String,
    },

    /// A one-of group or batch spec references a field the descriptor does not declare
    #[error("'{tool}.{action}' references undeclared field '{field}'")]
    UndeclaredField {
        tool: String,
        action: String,
        field: String,
    },

    /// A one-of group has no members
    #[error("One-of group '{group}' in '{tool}.{action}' is empty")]
    EmptyGroup {
        tool: String,
        action: String,
        group: String,
    },
}

/// Wire-level error codes carried in `error_code`
///
/// Protocol codes are produced before any Operation runs. Domain codes are
/// produced by Operations and passed through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Protocol
    MissingProperty,
    InvalidIdentifier,
    InvalidValue,
    InvalidRequest,
    UnknownTool,
    UnknownAction,

    // Domain
    NotFound,
    ActorNotFound,
    RowNotFound,
    ComponentNotFound,
    StructNotFound,
    AlreadyExists,
    AttachFailed,
    DetachFailed,
    RenameFailed,
    OperationFailed,

    // Host
    Timeout,
    InternalError,
}

impl ErrorCode {
    /// Whether this code is raised by the protocol layer rather than an Operation
    pub fn is_protocol(self) -> bool {
        matches!(
            self,
            Self::MissingProperty
                | Self::InvalidIdentifier
                | Self::InvalidValue
                | Self::InvalidRequest
                | Self::UnknownTool
                | Self::UnknownAction
        )
    }

    /// The literal string used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingProperty => "MISSING_PROPERTY",
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::InvalidValue => "INVALID_VALUE",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::UnknownTool => "UNKNOWN_TOOL",
            Self::UnknownAction => "UNKNOWN_ACTION",
            Self::NotFound => "NOT_FOUND",
            Self::ActorNotFound => "ACTOR_NOT_FOUND",
            Self::RowNotFound => "ROW_NOT_FOUND",
            Self::ComponentNotFound => "COMPONENT_NOT_FOUND",
            Self::StructNotFound => "STRUCT_NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::AttachFailed => "ATTACH_FAILED",
            Self::DetachFailed => "DETACH_FAILED",
            Self::RenameFailed => "RENAME_FAILED",
            Self::OperationFailed => "OPERATION_FAILED",
            Self::Timeout => "TIMEOUT",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an Operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct OperationError {
    pub code: ErrorCode,
    pub message: String,
}

impl OperationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidValue, message)
    }
}

/// Rejection produced by the validation engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ValidationError {
    pub code: ErrorCode,
    /// Canonical field (or one-of group) the error is about
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: ErrorCode, field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code,
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}
