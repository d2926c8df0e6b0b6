//! Request dispatcher
//!
//! Drives one request through its lifecycle:
//!
//! ```text
//! Parsed -> Resolved -> Validated -> Invoked -> Enveloped
//! ```
//!
//! A request that fails before `Validated` skips `Invoked` and goes straight to
//! an error envelope, so no Operation ever sees unvalidated input. The
//! dispatcher never returns an error or panics; every outcome is an envelope.

use serde_json::Value;

use crate::batch::{run_batch, BatchItem};
use crate::envelope::ResponseEnvelope;
use crate::error::ErrorCode;
use crate::params::ResolvedParameters;
use crate::registry::{ActionRegistry, RegisteredAction};
use crate::request::Request;
use crate::session::{invoke, Session};
use crate::validate::validate;

/// Lifecycle stage a request reached before it was enveloped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Parsed,
    Resolved,
    Validated,
    Invoked,
}

impl std::fmt::Display for RequestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Resolved => "resolved",
            Self::Validated => "validated",
            Self::Invoked => "invoked",
        };
        write!(f, "{name}")
    }
}

/// Routes `{Action, ParamsJson}` requests to registered Operations
pub struct Dispatcher<S> {
    registry: ActionRegistry<S>,
}

impl<S: Session + 'static> Dispatcher<S> {
    pub fn new(registry: ActionRegistry<S>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ActionRegistry<S> {
        &self.registry
    }

    /// Dispatch a raw request envelope to `tool`
    pub fn dispatch(&self, session: &mut S, tool: &str, envelope: &Value) -> ResponseEnvelope {
        match Request::from_value(envelope) {
            Ok(request) => self.dispatch_request(session, tool, &request),
            Err(err) => {
                tracing::debug!(tool, code = %err.code, "Rejected malformed request");
                err.into()
            }
        }
    }

    /// Dispatch an already-parsed request to `tool`
    pub fn dispatch_request(&self, session: &mut S, tool: &str, request: &Request) -> ResponseEnvelope {
        let span = tracing::info_span!("dispatch", tool, action = %request.action);
        let _entered = span.enter();

        let (envelope, stage) = self.run(session, tool, request);
        match (&envelope.error_code, stage) {
            (None, _) => tracing::debug!(%stage, "Request succeeded"),
            (Some(code), RequestStage::Invoked) => {
                tracing::info!(%stage, %code, error = ?envelope.error, "Operation failed");
            }
            (Some(code), _) => tracing::debug!(%stage, %code, "Request rejected"),
        }
        envelope
    }

    fn run(&self, session: &mut S, tool: &str, request: &Request) -> (ResponseEnvelope, RequestStage) {
        let Some(registered_tool) = self.registry.tool(tool) else {
            let known = self.registry.tool_names().join(", ");
            return (
                ResponseEnvelope::failure(
                    ErrorCode::UnknownTool,
                    format!("Unknown tool '{tool}'. Available tools: {known}"),
                ),
                RequestStage::Parsed,
            );
        };

        let Some(action) = registered_tool.action(&request.action) else {
            return (
                ResponseEnvelope::failure(
                    ErrorCode::UnknownAction,
                    format!(
                        "Unknown action '{}' for {}. Valid actions: {}",
                        request.action,
                        registered_tool.name,
                        registered_tool.action_names().join(", ")
                    ),
                ),
                RequestStage::Parsed,
            );
        };

        let validated = match validate(&action.descriptor, &request.params) {
            Ok(validated) => validated,
            Err(err) => return (err.into(), RequestStage::Resolved),
        };
        for diagnostic in &validated.diagnostics {
            tracing::warn!(%diagnostic, "Parameter diagnostic");
        }

        let (envelope, stage) = Self::invoke_action(session, action, &validated.params);
        (envelope.with_warnings(&validated.diagnostics), stage)
    }

    fn invoke_action(
        session: &mut S,
        action: &RegisteredAction<S>,
        params: &ResolvedParameters,
    ) -> (ResponseEnvelope, RequestStage) {
        let descriptor = &action.descriptor;
        let label = format!("{}.{}", descriptor.tool, descriptor.action);

        let batch = descriptor
            .batch
            .as_ref()
            .and_then(|batch| params.get(&batch.items_field).map(|items| (batch, items)));

        if let Some((batch, collection)) = batch {
            let items = BatchItem::collect(collection, &batch.key_field);
            if items.is_empty() {
                return (
                    ResponseEnvelope::failure(
                        ErrorCode::InvalidValue,
                        format!("'{}' must contain at least one item", batch.items_field),
                    ),
                    RequestStage::Validated,
                );
            }

            if let Err(err) = action.prepare_batch(session, params) {
                return (err.into(), RequestStage::Invoked);
            }

            let report = run_batch(session, &label, &items, |s, item| {
                action.execute_item(s, params, item)
            });
            let message = report.message(batch);
            return (
                ResponseEnvelope::ok(report.into_output(batch)).with_message(message),
                RequestStage::Invoked,
            );
        }

        let envelope = match invoke(session, &label, |s| action.execute(s, params)) {
            Ok(output) => ResponseEnvelope::ok(output),
            Err(err) => err.into(),
        };
        (envelope, RequestStage::Invoked)
    }
}
