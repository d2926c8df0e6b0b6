//! Editor state management for the MCP server
//!
//! The editor document is a single mutable resource, so it lives on a
//! dedicated thread and tool calls reach it by message passing. Requests are
//! handled strictly one at a time in arrival order. The async side bounds each
//! wait with the configured operation timeout.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use stagehand_core::dispatch::Dispatcher;
use stagehand_core::envelope::ResponseEnvelope;
use stagehand_core::ErrorCode;
use stagehand_editor::{EditorDocument, builtin_dispatcher};
use tokio::sync::{mpsc, oneshot};

use crate::config::ServerConfig;

/// Commands sent to the editor thread
enum Command {
    Dispatch {
        tool: String,
        envelope: Value,
        respond: oneshot::Sender<ResponseEnvelope>,
    },
    Snapshot {
        respond: oneshot::Sender<DocumentSummary>,
    },
}

/// Handle to the editor thread
///
/// This is Send + Sync and can be cloned and shared between tasks.
#[derive(Clone)]
pub struct EditorState {
    sender: mpsc::UnboundedSender<Command>,
    dispatcher: Arc<Dispatcher<EditorDocument>>,
    timeout: Duration,
}

impl EditorState {
    /// Spawn the editor thread with a document built from `config`
    ///
    /// # Errors
    /// Returns an error if a built-in tool fails to register or the thread
    /// cannot be spawned.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let document = if config.seed_demo_content {
            EditorDocument::with_demo_content()
        } else {
            EditorDocument::new()
        };
        Self::with_document(document, config.operation_timeout())
    }

    /// Spawn the editor thread around an existing document
    pub fn with_document(document: EditorDocument, timeout: Duration) -> Result<Self> {
        let dispatcher = builtin_dispatcher().context("Failed to register built-in tools")?;
        Self::with_dispatcher(dispatcher, document, timeout)
    }

    /// Spawn the editor thread with a caller-built dispatcher
    pub fn with_dispatcher(
        dispatcher: Dispatcher<EditorDocument>,
        document: EditorDocument,
        timeout: Duration,
    ) -> Result<Self> {
        let dispatcher = Arc::new(dispatcher);
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();

        let worker = Arc::clone(&dispatcher);
        thread::Builder::new()
            .name("stagehand-editor".to_string())
            .spawn(move || {
                let mut document = document;

                // Process commands
                while let Some(cmd) = rx.blocking_recv() {
                    match cmd {
                        Command::Dispatch {
                            tool,
                            envelope,
                            respond,
                        } => {
                            let response = worker.dispatch(&mut document, &tool, &envelope);
                            if respond.send(response).is_err() {
                                tracing::debug!(tool = %tool, "Caller stopped waiting for response");
                            }
                        }

                        Command::Snapshot { respond } => {
                            let _ = respond.send(DocumentSummary::from(&document));
                        }
                    }
                }
                tracing::debug!("Editor thread shutting down");
            })
            .context("Failed to spawn editor thread")?;

        Ok(Self {
            sender: tx,
            dispatcher,
            timeout,
        })
    }

    /// Dispatcher shared with the editor thread, for discovery
    pub fn dispatcher(&self) -> &Dispatcher<EditorDocument> {
        &self.dispatcher
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one `{Action, ParamsJson}` request against `tool`
    ///
    /// Always answers with an envelope. If the editor thread does not reply
    /// within the operation timeout the caller gets `TIMEOUT`; the request
    /// still completes on the editor thread and later requests queue behind it.
    pub async fn dispatch(&self, tool: &str, envelope: Value) -> ResponseEnvelope {
        let (tx, rx) = oneshot::channel();
        let command = Command::Dispatch {
            tool: tool.to_string(),
            envelope,
            respond: tx,
        };
        if self.sender.send(command).is_err() {
            tracing::error!(tool, "Editor thread is not running");
            return ResponseEnvelope::failure(ErrorCode::InternalError, "Editor thread is not running");
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                tracing::error!(tool, "Editor thread dropped the request");
                ResponseEnvelope::failure(ErrorCode::InternalError, "Editor thread dropped the request")
            }
            Err(_) => {
                let ms = self.timeout.as_millis();
                tracing::warn!(tool, timeout_ms = %ms, "Operation timed out");
                ResponseEnvelope::failure(
                    ErrorCode::Timeout,
                    format!("Operation did not finish within {ms} ms"),
                )
            }
        }
    }

    /// Counts describing the current document
    pub async fn summary(&self) -> Result<DocumentSummary> {
        let (tx, rx) = oneshot::channel();
        self.sender.send(Command::Snapshot { respond: tx })?;
        Ok(rx.await?)
    }
}

/// Summary of the editor document
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DocumentSummary {
    pub tables: Vec<String>,
    pub row_structs: Vec<String>,
    pub actor_count: usize,
    pub committed_transactions: usize,
}

impl From<&EditorDocument> for DocumentSummary {
    fn from(doc: &EditorDocument) -> Self {
        Self {
            tables: doc.tables().map(|t| t.path.clone()).collect(),
            row_structs: doc.struct_paths().into_iter().map(String::from).collect(),
            actor_count: doc.actors().len(),
            committed_transactions: doc.committed_count(),
        }
    }
}

impl std::fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} data tables, {} row structs, {} actors, {} committed edits",
            self.tables.len(),
            self.row_structs.len(),
            self.actor_count,
            self.committed_transactions
        )
    }
}
