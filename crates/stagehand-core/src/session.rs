//! Editor session boundary and the operation invoker
//!
//! Operations never reach into global editor state. They receive an explicit
//! session handle, and every invocation is wrapped in a transaction scope on
//! that session so a failed multi-step Operation leaves nothing half-applied.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::{Map, Value};

use crate::error::{ErrorCode, OperationError};

/// Data returned by a successful Operation; merged into the response envelope
pub type OperationOutput = Map<String, Value>;

/// Outcome of running an Operation
pub type OperationResult = std::result::Result<OperationOutput, OperationError>;

/// Mutable editor state an Operation runs against
pub trait Session {
    /// Open a transaction scope
    fn begin_transaction(&mut self, label: &str);

    /// Make the changes since the matching `begin_transaction` permanent
    fn commit(&mut self);

    /// Discard the changes since the matching `begin_transaction`
    fn rollback(&mut self);
}

/// Run `operation` inside a transaction scope on `session`
///
/// Commits on success and rolls back on failure. A panicking Operation is
/// rolled back and reported as `INTERNAL_ERROR`; domain error codes pass
/// through untouched.
pub fn invoke<S, F>(session: &mut S, label: &str, operation: F) -> OperationResult
where
    S: Session,
    F: FnOnce(&mut S) -> OperationResult,
{
    session.begin_transaction(label);

    let outcome = catch_unwind(AssertUnwindSafe(|| operation(&mut *session)));

    match outcome {
        Ok(Ok(output)) => {
            session.commit();
            Ok(output)
        }
        Ok(Err(err)) => {
            tracing::debug!(transaction = label, code = %err.code, "Operation failed, rolling back");
            session.rollback();
            Err(err)
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!(transaction = label, %reason, "Operation panicked, rolling back");
            session.rollback();
            Err(OperationError::new(
                ErrorCode::InternalError,
                format!("Operation '{label}' panicked: {reason}"),
            ))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
