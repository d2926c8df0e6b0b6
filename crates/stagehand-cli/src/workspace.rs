//! In-process editor session shared by every CLI subcommand

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use stagehand_core::dispatch::Dispatcher;
use stagehand_core::envelope::ResponseEnvelope;
use stagehand_core::registry::ActionRegistry;
use stagehand_editor::{EditorDocument, builtin_dispatcher};

/// A document plus the dispatcher that edits it
pub struct Workspace {
    dispatcher: Dispatcher<EditorDocument>,
    document: EditorDocument,
    empty: bool,
}

impl Workspace {
    pub fn new(empty: bool) -> Result<Self> {
        let dispatcher = builtin_dispatcher().context("Failed to register built-in tools")?;
        Ok(Self {
            dispatcher,
            document: fresh_document(empty),
            empty,
        })
    }

    pub fn registry(&self) -> &ActionRegistry<EditorDocument> {
        self.dispatcher.registry()
    }

    pub fn document(&self) -> &EditorDocument {
        &self.document
    }

    /// Discard every edit and start over
    pub fn reset(&mut self) {
        self.document = fresh_document(self.empty);
    }

    /// Run one request envelope against `tool`
    ///
    /// Short tool names are accepted: `data_table` means `manage_data_table`.
    pub fn call(&mut self, tool: &str, envelope: &Value) -> ResponseEnvelope {
        let name = resolve_tool(self.registry(), tool).unwrap_or(tool).to_string();
        self.dispatcher.dispatch(&mut self.document, &name, envelope)
    }
}

fn fresh_document(empty: bool) -> EditorDocument {
    if empty {
        EditorDocument::new()
    } else {
        EditorDocument::with_demo_content()
    }
}

/// Map a full or short tool name to its registered name
pub fn resolve_tool<S>(registry: &ActionRegistry<S>, name: &str) -> Option<&'static str> {
    let name = name.trim();
    registry.tool_names().into_iter().find(|registered| {
        registered.eq_ignore_ascii_case(name)
            || registered
                .strip_prefix("manage_")
                .is_some_and(|short| short.eq_ignore_ascii_case(name))
    })
}

/// Build a request envelope from an action and its parameter text
///
/// Empty text means no parameters. Anything else must be JSON.
pub fn envelope(action: &str, params: &str) -> Result<Value> {
    let params = params.trim();
    let params: Value = if params.is_empty() {
        json!({})
    } else {
        serde_json::from_str(params).with_context(|| format!("Parameters are not valid JSON: {params}"))?
    };
    Ok(json!({ "Action": action, "ParamsJson": params }))
}

/// Parse a `tool action {json}` line into a tool name and request envelope
pub fn parse_invocation(line: &str) -> Result<(String, Value)> {
    let line = line.trim();
    let (tool, rest) = split_word(line);
    let (action, params) = split_word(rest);
    if tool.is_empty() || action.is_empty() {
        bail!("Expected: <tool> <action> [json params]");
    }
    Ok((tool.to_string(), envelope(action, params)?))
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

/// Parse one line of a request script
///
/// Lines are JSON objects `{"tool": ..., "Action": ..., "ParamsJson": ...}`.
/// Blank lines and lines starting with `#` or `//` are skipped.
pub fn parse_script_line(line: &str) -> Result<Option<(String, Value)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
        return Ok(None);
    }
    let mut value: Value = serde_json::from_str(line).context("Line is not valid JSON")?;
    let Some(body) = value.as_object_mut() else {
        bail!("Line must be a JSON object");
    };
    let tool = match body.remove("tool") {
        Some(Value::String(tool)) => tool,
        Some(_) => bail!("'tool' must be a string"),
        None => bail!("Line is missing 'tool'"),
    };
    Ok(Some((tool, value)))
}

/// Human-readable listing of tools and their actions
pub fn describe_tools<S>(registry: &ActionRegistry<S>, only: Option<&str>) -> Result<String> {
    let tools: Vec<_> = match only {
        Some(name) => {
            let Some(tool) = resolve_tool(registry, name).and_then(|n| registry.tool(n)) else {
                bail!(
                    "Unknown tool '{name}'. Available: {}",
                    registry.tool_names().join(", ")
                );
            };
            vec![tool]
        }
        None => registry.tools().collect(),
    };

    let mut out = String::new();
    for tool in tools {
        out.push_str(&format!("{} - {}\n", tool.name, tool.description));
        for action in &tool.actions {
            let d = &action.descriptor;
            let mut notes = Vec::new();
            let required: Vec<&str> = d
                .fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name.as_str())
                .collect();
            if !required.is_empty() {
                notes.push(format!("requires {}", required.join(", ")));
            }
            for group in &d.one_of {
                notes.push(format!("one of {}", group.members.join("|")));
            }
            if let Some(batch) = &d.batch {
                notes.push(format!("batch over {}", batch.items_field));
            }
            if d.requires_confirmation {
                notes.push("confirm=true".to_string());
            }
            if notes.is_empty() {
                out.push_str(&format!("  {}\n", d.action));
            } else {
                out.push_str(&format!("  {:<18} {}\n", d.action, notes.join("; ")));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        Workspace::new(false).unwrap_or_else(|e| panic!("workspace should build: {e}"))
    }

    #[test]
    fn test_resolve_short_and_full_names() {
        let ws = workspace();
        assert_eq!(resolve_tool(ws.registry(), "data_table"), Some("manage_data_table"));
        assert_eq!(resolve_tool(ws.registry(), "MANAGE_LEVEL_ACTORS"), Some("manage_level_actors"));
        assert_eq!(resolve_tool(ws.registry(), "blueprint"), None);
    }

    #[test]
    fn test_parse_invocation() {
        let Ok((tool, envelope)) =
            parse_invocation(r#"data_table get_row {"TablePath": "/Game/Data/DT_Items", "RowName": "Sword"}"#)
        else {
            panic!("line should parse");
        };
        assert_eq!(tool, "data_table");
        assert_eq!(envelope["Action"], "get_row");
        assert_eq!(envelope["ParamsJson"]["RowName"], "Sword");

        let Ok((_, bare)) = parse_invocation("level_actors list") else {
            panic!("line without params should parse");
        };
        assert_eq!(bare["ParamsJson"], json!({}));

        assert!(parse_invocation("data_table").is_err());
        assert!(parse_invocation("data_table get_row {broken").is_err());
    }

    #[test]
    fn test_parse_script_line() {
        assert!(matches!(parse_script_line("   "), Ok(None)));
        assert!(matches!(parse_script_line("# comment"), Ok(None)));

        let Ok(Some((tool, envelope))) = parse_script_line(
            r#"{"tool": "manage_level_actors", "Action": "find", "ParamsJson": {"ActorName": "Sun"}}"#,
        ) else {
            panic!("line should parse");
        };
        assert_eq!(tool, "manage_level_actors");
        assert!(envelope.get("tool").is_none());
        assert_eq!(envelope["Action"], "find");

        assert!(parse_script_line(r#"{"Action": "find"}"#).is_err());
        assert!(parse_script_line("[1, 2]").is_err());
    }

    #[test]
    fn test_call_and_reset() {
        let mut ws = workspace();
        let Ok(request) = envelope("remove", r#"{"ActorName": "Sun"}"#) else {
            panic!("envelope should build");
        };
        let response = ws.call("level_actors", &request);
        assert!(response.success, "{:?}", response.error);
        assert_eq!(ws.document().actors().len(), 2);

        ws.reset();
        assert_eq!(ws.document().actors().len(), 3);
    }

    #[test]
    fn test_describe_tools() {
        let ws = workspace();
        let Ok(text) = describe_tools(ws.registry(), Some("data_table")) else {
            panic!("listing should render");
        };
        assert!(text.starts_with("manage_data_table"));
        assert!(text.contains("clear_rows"));
        assert!(text.contains("confirm=true"));
        assert!(!text.contains("manage_level_actors"));

        assert!(describe_tools(ws.registry(), Some("nope")).is_err());
    }
}
