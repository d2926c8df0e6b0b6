//! MCP tool request types for Stagehand
//!
//! - `manage_*` tools take [`ManageRequest`]: an action name and its parameters
//! - Discovery (list_actions, describe_action) reads action descriptors

pub mod discovery;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

/// Request for any `manage_*` tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ManageRequest {
    /// Action to run, e.g. "add_row". Use list_actions to see every action of a tool.
    #[serde(rename = "Action", alias = "action")]
    pub action: String,

    /// Parameters of the action, as a JSON object or a string containing one
    #[serde(rename = "ParamsJson", alias = "params_json", default)]
    pub params_json: Value,
}

impl ManageRequest {
    /// The `{Action, ParamsJson}` envelope handed to the dispatcher
    pub fn into_envelope(self) -> Value {
        json!({"Action": self.action, "ParamsJson": self.params_json})
    }
}
