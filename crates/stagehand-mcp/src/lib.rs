//! Stagehand MCP Server - Model Context Protocol server for editor-facing tools
//!
//! Every editor tool is exposed with the same two-field input:
//!
//! ```json
//! { "Action": "add_rows", "ParamsJson": { "TablePath": "/Game/Data/DT_Items", "rows": { ... } } }
//! ```
//!
//! and answers with a flat JSON envelope: `success`, `message`, `error`,
//! `error_code`, plus the action's own fields.
//!
//! ## Workflow
//!
//! 1. `list_actions` - See which actions each tool has
//! 2. `describe_action` - Get one action's parameters, aliases and identifier groups
//! 3. `manage_data_table` / `manage_level_actors` - Run actions

pub mod config;
pub mod state;
pub mod tools;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use stagehand_core::envelope::ResponseEnvelope;

use crate::state::EditorState;
use crate::tools::ManageRequest;
use crate::tools::discovery::{self, DescribeActionRequest, ListActionsRequest};

// Re-export for binary
pub use config::ServerConfig;
pub use rmcp;
pub use state::EditorState as State;

/// The Stagehand MCP service
///
/// EditorState owns the document on its own thread, so the service itself is
/// Send + Sync and cheap to clone.
#[derive(Clone)]
pub struct StagehandMcpService {
    state: EditorState,
    tool_router: ToolRouter<Self>,
}

fn envelope_result(envelope: &ResponseEnvelope) -> CallToolResult {
    CallToolResult::success(vec![Content::text(envelope.to_json_pretty())])
}

#[tool_router]
impl StagehandMcpService {
    /// Create a new MCP service with the given state
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    // ========================================================================
    // Editor Tools
    // ========================================================================

    #[tool(description = "Manage data tables. Actions: create, list_rows, get_row, add_row, add_rows, update_row, rename_row, remove_row, remove_rows, clear_rows. Every action needs table_path (aliases: TablePath, DataTable, path). clear_rows requires confirm=true. add_rows reports added_rows and failed_rows instead of failing the whole call.")]
    async fn manage_data_table(
        &self,
        params: Parameters<ManageRequest>,
    ) -> Result<CallToolResult, McpError> {
        let envelope = self
            .state
            .dispatch("manage_data_table", params.0.into_envelope())
            .await;
        Ok(envelope_result(&envelope))
    }

    #[tool(description = "Manage actors in the open level. Actions: spawn, find, list, rename, set_transform, attach, detach, remove, add_component, remove_component. Identify an actor with exactly one of actor_label (alias ActorName), actor_path, actor_guid or actor_tag. remove also accepts actor_labels to remove several actors at once.")]
    async fn manage_level_actors(
        &self,
        params: Parameters<ManageRequest>,
    ) -> Result<CallToolResult, McpError> {
        let envelope = self
            .state
            .dispatch("manage_level_actors", params.0.into_envelope())
            .await;
        Ok(envelope_result(&envelope))
    }

    // ========================================================================
    // Discovery Tools
    // ========================================================================

    #[tool(description = "List every tool and its actions, with required parameters, identifier groups, and which actions are batch or need confirm=true. Pass tool to list a single tool.")]
    async fn list_actions(
        &self,
        params: Parameters<ListActionsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let registry = self.state.dispatcher().registry();
        let envelope = discovery::list_actions(registry, params.0.tool.as_deref());
        Ok(envelope_result(&envelope))
    }

    #[tool(description = "Describe one action in full: every parameter with its type, aliases, default and whether it is required, plus identifier groups and batch layout.")]
    async fn describe_action(
        &self,
        params: Parameters<DescribeActionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let request = params.0;
        let registry = self.state.dispatcher().registry();
        let envelope = discovery::describe_action(registry, &request.tool, &request.action);
        Ok(envelope_result(&envelope))
    }

    #[tool(description = "Summarise the editor document: data tables, row structs, actor count and committed edits.")]
    async fn get_document_info(&self) -> Result<CallToolResult, McpError> {
        match self.state.summary().await {
            Ok(summary) => {
                let json = serde_json::to_string_pretty(&summary).unwrap_or_default();
                Ok(CallToolResult::success(vec![Content::text(json)]))
            }
            Err(e) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Error: {}",
                e
            ))])),
        }
    }
}

#[tool_handler]
impl ServerHandler for StagehandMcpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "stagehand-mcp".to_string(),
                title: Some("Stagehand Editor Tools".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Stagehand MCP server for editing data tables and level actors. \
                 \n\nEvery manage_* tool takes {\"Action\": <name>, \"ParamsJson\": <object or JSON string>} \
                 and returns {\"success\": bool, ...}. Failures carry error and error_code.\n\n\
                 Workflow:\n\
                 1. list_actions() - See the actions of each tool\n\
                 2. describe_action(tool, action) - Get parameters, aliases and identifier groups\n\
                 3. manage_data_table / manage_level_actors - Run actions\n\n\
                 Destructive actions such as clear_rows require confirm=true."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_manage_tools_return_envelopes() {
        let Ok(state) = EditorState::new(&ServerConfig::default()) else {
            panic!("state should start");
        };
        let service = StagehandMcpService::new(state);

        let request: ManageRequest = serde_json::from_value(json!({
            "Action": "list_rows",
            "ParamsJson": {"TablePath": "/Game/Data/DT_Items"}
        }))
        .unwrap_or_else(|e| panic!("request should parse: {e}"));

        let result = service.manage_data_table(Parameters(request)).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_server_info() {
        let Ok(state) = EditorState::new(&ServerConfig::default()) else {
            panic!("state should start");
        };
        let info = StagehandMcpService::new(state).get_info();
        assert_eq!(info.server_info.name, "stagehand-mcp");
        assert!(info.capabilities.tools.is_some());
    }
}
