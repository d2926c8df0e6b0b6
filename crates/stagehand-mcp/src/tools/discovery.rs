//! Action discovery tools for the MCP server
//!
//! Lets agents find out which actions a tool has and what parameters each one
//! accepts, including aliases, one-of identifier groups and batch layouts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use stagehand_core::ErrorCode;
use stagehand_core::envelope::ResponseEnvelope;
use stagehand_core::registry::{ActionRegistry, RegisteredTool};

/// Request for listing actions
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListActionsRequest {
    /// Only list this tool's actions; omit for every tool
    #[serde(default)]
    pub tool: Option<String>,
}

/// Request for one action's full parameter contract
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DescribeActionRequest {
    /// Tool name, e.g. "manage_data_table"
    pub tool: String,
    /// Action name, e.g. "add_rows"
    pub action: String,
}

/// Short form of one action
#[derive(Debug, Clone, Serialize)]
pub struct ActionInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub required: Vec<String>,
    /// Identifier groups; exactly one member of each must be given
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Vec<String>>,
    pub batch: bool,
    pub requires_confirmation: bool,
}

/// Short form of one tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub actions: Vec<ActionInfo>,
}

impl<S> From<&RegisteredTool<S>> for ToolInfo {
    fn from(tool: &RegisteredTool<S>) -> Self {
        let actions = tool
            .actions
            .iter()
            .map(|action| {
                let d = &action.descriptor;
                ActionInfo {
                    name: d.action.clone(),
                    summary: d.summary.clone(),
                    required: d
                        .fields
                        .iter()
                        .filter(|f| f.required)
                        .map(|f| f.name.clone())
                        .collect(),
                    one_of: d.one_of.iter().map(|g| g.members.clone()).collect(),
                    batch: d.batch.is_some(),
                    requires_confirmation: d.requires_confirmation,
                }
            })
            .collect();
        Self {
            name: tool.name,
            description: tool.description,
            actions,
        }
    }
}

/// List every tool, or one tool, with its actions
pub fn list_actions<S>(registry: &ActionRegistry<S>, tool: Option<&str>) -> ResponseEnvelope {
    let tools: Vec<ToolInfo> = match tool {
        Some(name) => match registry.tool(name) {
            Some(tool) => vec![ToolInfo::from(tool)],
            None => return unknown_tool(registry, name),
        },
        None => registry.tools().map(ToolInfo::from).collect(),
    };

    let mut data = Map::new();
    data.insert("count".into(), json!(tools.len()));
    data.insert("tools".into(), json!(tools));
    ResponseEnvelope::ok(data)
}

/// Full descriptor of one action
pub fn describe_action<S>(registry: &ActionRegistry<S>, tool: &str, action: &str) -> ResponseEnvelope {
    let Some(registered) = registry.tool(tool) else {
        return unknown_tool(registry, tool);
    };
    let Some(found) = registered.action(action) else {
        return ResponseEnvelope::failure(
            ErrorCode::UnknownAction,
            format!(
                "Unknown action '{action}' for {}. Valid actions: {}",
                registered.name,
                registered.action_names().join(", ")
            ),
        );
    };

    let mut data = Map::new();
    data.insert("descriptor".into(), json!(found.descriptor));
    ResponseEnvelope::ok(data)
}

fn unknown_tool<S>(registry: &ActionRegistry<S>, tool: &str) -> ResponseEnvelope {
    ResponseEnvelope::failure(
        ErrorCode::UnknownTool,
        format!(
            "Unknown tool '{tool}'. Available tools: {}",
            registry.tool_names().join(", ")
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_editor::builtin_registry;

    #[test]
    fn test_list_all_tools() {
        let Ok(registry) = builtin_registry() else {
            panic!("built-in tools should register");
        };
        let response = list_actions(&registry, None);
        assert!(response.success);
        assert_eq!(response.data["count"], json!(2));
        assert_eq!(response.data["tools"][0]["name"], json!("manage_data_table"));
    }

    #[test]
    fn test_clear_rows_is_flagged() {
        let Ok(registry) = builtin_registry() else {
            panic!("built-in tools should register");
        };
        let response = list_actions(&registry, Some("manage_data_table"));
        let actions = response.data["tools"][0]["actions"].as_array().cloned().unwrap_or_default();
        let clear = actions.iter().find(|a| a["name"] == json!("clear_rows"));
        assert_eq!(clear.map(|a| a["requires_confirmation"].clone()), Some(json!(true)));
    }

    #[test]
    fn test_describe_unknowns() {
        let Ok(registry) = builtin_registry() else {
            panic!("built-in tools should register");
        };
        let response = describe_action(&registry, "manage_lights", "spawn");
        assert_eq!(response.error_code, Some(ErrorCode::UnknownTool));
        let response = describe_action(&registry, "manage_level_actors", "explode");
        assert_eq!(response.error_code, Some(ErrorCode::UnknownAction));
        let response = describe_action(&registry, "manage_level_actors", "remove");
        assert_eq!(response.data["descriptor"]["batch"]["items_field"], json!("actor_labels"));
    }
}
