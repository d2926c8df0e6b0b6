//! Editor thread, timeout and config behaviour of the MCP server
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use serde_json::{Map, json};
use stagehand_core::prelude::*;
use stagehand_editor::{EditorDocument, builtin_registry};
use stagehand_mcp::ServerConfig;
use stagehand_mcp::state::EditorState;

#[derive(Debug, Clone, Copy)]
enum SlowAction {
    Wait,
}

impl ToolAction for SlowAction {
    const ALL: &'static [Self] = &[Self::Wait];

    fn name(self) -> &'static str {
        "wait"
    }
}

/// Sleeps for `ms` milliseconds on the editor thread
struct SlowTool;

impl Tool<EditorDocument> for SlowTool {
    type Action = SlowAction;

    fn name(&self) -> &'static str {
        "slow_tool"
    }

    fn describe(&self, action: SlowAction) -> ActionDescriptor {
        ActionDescriptor::new("slow_tool", action.name()).field(FieldSpec::integer("ms").required())
    }

    fn execute(
        &self,
        _action: SlowAction,
        _session: &mut EditorDocument,
        params: &ResolvedParameters,
    ) -> OperationResult {
        let ms = params.get("ms").and_then(|v| v.as_u64()).unwrap_or(0);
        std::thread::sleep(Duration::from_millis(ms));
        let mut out = Map::new();
        out.insert("slept_ms".to_string(), json!(ms));
        Ok(out)
    }
}

fn slow_state(timeout: Duration) -> EditorState {
    let registry = builtin_registry().unwrap().with(SlowTool).unwrap();
    EditorState::with_dispatcher(
        Dispatcher::new(registry),
        EditorDocument::with_demo_content(),
        timeout,
    )
    .unwrap()
}

#[tokio::test]
async fn dispatch_runs_on_editor_thread() {
    let state = EditorState::new(&ServerConfig::default()).unwrap();

    let response = state
        .dispatch(
            "manage_data_table",
            json!({"Action": "add_row", "ParamsJson": {"TablePath": "/Game/Data/DT_Items", "RowName": "Bow"}}),
        )
        .await;
    assert!(response.success, "{:?}", response.error);

    let summary = state.summary().await.unwrap();
    assert_eq!(summary.tables, vec!["/Game/Data/DT_Items".to_string()]);
    assert_eq!(summary.actor_count, 3);
    assert_eq!(summary.committed_transactions, 1);
}

#[tokio::test]
async fn empty_config_starts_without_content() {
    let config = ServerConfig {
        seed_demo_content: false,
        ..ServerConfig::default()
    };
    let state = EditorState::new(&config).unwrap();
    let summary = state.summary().await.unwrap();
    assert!(summary.tables.is_empty());
    assert_eq!(summary.actor_count, 0);
}

#[tokio::test]
async fn unknown_tool_is_reported_in_envelope() {
    let state = EditorState::new(&ServerConfig::default()).unwrap();
    let response = state
        .dispatch("manage_blueprint", json!({"Action": "create", "ParamsJson": {}}))
        .await;
    assert!(!response.success);
    assert_eq!(response.error_code, Some(ErrorCode::UnknownTool));
}

#[tokio::test]
async fn slow_operation_times_out_and_later_requests_still_run() {
    let state = slow_state(Duration::from_millis(20));

    let response = state
        .dispatch("slow_tool", json!({"Action": "wait", "ParamsJson": {"ms": 200}}))
        .await;
    assert!(!response.success);
    assert_eq!(response.error_code, Some(ErrorCode::Timeout));

    // Queued behind the slow request; give it the time it needs.
    tokio::time::sleep(Duration::from_millis(250)).await;
    let response = state
        .dispatch(
            "manage_level_actors",
            json!({"Action": "find", "ParamsJson": {"ActorName": "Sun"}}),
        )
        .await;
    assert!(response.success, "{:?}", response.error);
}

#[tokio::test]
async fn fast_operation_within_timeout_succeeds() {
    let state = slow_state(Duration::from_secs(5));
    let response = state
        .dispatch("slow_tool", json!({"Action": "wait", "ParamsJson": {"ms": 1}}))
        .await;
    assert!(response.success);
    assert_eq!(response.data["slept_ms"], 1);
}

#[test]
fn config_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = ServerConfig {
        operation_timeout_ms: 1_500,
        log_filter: "stagehand_core=debug".to_string(),
        seed_demo_content: false,
    };
    config.save(&path).unwrap();

    let (loaded, error) = ServerConfig::load(Some(&path));
    assert_eq!(loaded, config);
    assert!(error.is_none());
    assert_eq!(ServerConfig::from_file(&path).unwrap(), config);
}

#[test]
fn unreadable_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(ServerConfig::from_file(&path).is_err());
    let (loaded, error) = ServerConfig::load(Some(&path));
    assert_eq!(loaded, ServerConfig::default());
    let error = error.expect("parse error is handed back for logging");
    assert!(format!("{error:#}").contains("Failed to parse config file"));
}
