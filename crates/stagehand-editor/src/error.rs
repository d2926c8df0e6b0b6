//! Editor document errors

use stagehand_core::{ErrorCode, OperationError};
use thiserror::Error;

/// Result type for document edits
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// Failures raised by [`EditorDocument`](crate::EditorDocument) edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Data table '{0}' not found")]
    TableNotFound(String),

    #[error("Data table '{0}' already exists")]
    TableExists(String),

    #[error("Row struct '{0}' not found")]
    StructNotFound(String),

    #[error("Row '{row}' not found in '{table}'")]
    RowNotFound { table: String, row: String },

    #[error("Row already exists")]
    RowExists(String),

    #[error("Field '{field}' is not part of row struct '{row_struct}'")]
    UnknownRowField { field: String, row_struct: String },

    #[error("{0}")]
    InvalidRowName(String),

    #[error("{0}")]
    RenameFailed(String),

    #[error("No actor found with {0}")]
    ActorNotFound(String),

    #[error("An actor labelled '{0}' already exists")]
    ActorExists(String),

    #[error("{0}")]
    InvalidLabel(String),

    #[error("{0}")]
    AttachFailed(String),

    #[error("{0}")]
    DetachFailed(String),

    #[error("Component '{component}' not found on '{actor}'")]
    ComponentNotFound { actor: String, component: String },

    #[error("Component '{component}' already exists on '{actor}'")]
    ComponentExists { actor: String, component: String },
}

impl DocumentError {
    /// Wire code reported for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TableNotFound(_) => ErrorCode::NotFound,
            Self::StructNotFound(_) => ErrorCode::StructNotFound,
            Self::RowNotFound { .. } => ErrorCode::RowNotFound,
            Self::TableExists(_)
            | Self::RowExists(_)
            | Self::ActorExists(_)
            | Self::ComponentExists { .. } => ErrorCode::AlreadyExists,
            Self::UnknownRowField { .. } | Self::InvalidRowName(_) | Self::InvalidLabel(_) => {
                ErrorCode::InvalidValue
            }
            Self::RenameFailed(_) => ErrorCode::RenameFailed,
            Self::ActorNotFound(_) => ErrorCode::ActorNotFound,
            Self::AttachFailed(_) => ErrorCode::AttachFailed,
            Self::DetachFailed(_) => ErrorCode::DetachFailed,
            Self::ComponentNotFound { .. } => ErrorCode::ComponentNotFound,
        }
    }
}

impl From<DocumentError> for OperationError {
    fn from(err: DocumentError) -> Self {
        OperationError::new(err.code(), err.to_string())
    }
}
